use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::Address;
use thiserror::Error;
use tracing::info;

use crate::flashloan::{FeeError, FeeRate, ReserveFlashLender};
use crate::lending::{AssetConfig, LenderBook, LendingError, PooledLendingMarket};
use crate::modules::{LensModule, TraderModule};
use crate::registry::{Composer, ModuleCut, RegistryError};
use crate::state::{Position, StateError, WorldState};
use crate::venues::{
    ConstantProductVenue, FixedRatePool, FixedRateVenue, SwapVenue, VenueBook, VenueError,
};

use super::types::{ComposerConfig, VenueConfig, VenueKindConfig};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("venue 配置错误: {0}")]
    Venue(#[from] VenueError),
    #[error("lender 配置错误: {0}")]
    Lending(#[from] LendingError),
    #[error("闪电贷费率配置错误: {0}")]
    Fee(#[from] FeeError),
    #[error("初始状态错误: {0}")]
    State(#[from] StateError),
    #[error("模块注册失败: {0}")]
    Registry(#[from] RegistryError),
    #[error("仓位引用了未配置的 lender id {0}")]
    UnknownLender(u8),
}

/// 按配置装配 façade：场所、借贷市场、闪电贷提供方、初始状态与内置模块。
pub fn build_composer(config: &ComposerConfig) -> Result<Composer, LaunchError> {
    let mut venues = VenueBook::new();
    for venue in &config.venues {
        venues.register(venue.provider_id, build_venue(venue)?)?;
    }

    let mut lenders = LenderBook::new();
    let mut markets: BTreeMap<u8, Address> = BTreeMap::new();
    for lender in &config.lenders {
        let mut market = PooledLendingMarket::new(lender.id, lender.address);
        for asset in &lender.assets {
            market.list_asset(
                asset.token,
                AssetConfig {
                    price: asset.price,
                    ltv_bps: asset.ltv_bps,
                },
            )?;
        }
        lenders.register(Arc::new(market))?;
        markets.insert(lender.id, lender.address);
    }

    let mut state = WorldState::new();
    for seed in &config.balances {
        state.credit(seed.token, seed.holder, seed.amount)?;
    }
    for seed in &config.positions {
        let market = markets
            .get(&seed.lender)
            .copied()
            .ok_or(LaunchError::UnknownLender(seed.lender))?;
        state.set_position(
            market,
            seed.user,
            seed.asset,
            Position {
                collateral: seed.collateral,
                debt: seed.debt,
            },
        );
    }

    let flash = &config.flashloan;
    let provider = ReserveFlashLender::new(
        flash.provider,
        FeeRate::new(flash.fee, flash.denom)?,
        flash.mode,
    );

    let facade = &config.composer;
    let mut composer = Composer::new(
        facade.engine,
        facade.admin,
        state,
        Arc::new(venues),
        Arc::new(lenders),
        Arc::new(provider),
    );
    composer.configure(
        facade.admin,
        &[
            ModuleCut::add(Arc::new(TraderModule::new(facade.trader_module))),
            ModuleCut::add(Arc::new(LensModule::new(facade.lens_module))),
        ],
    )?;

    info!(
        target: "config::launch",
        engine = %facade.engine,
        venues = config.venues.len(),
        lenders = config.lenders.len(),
        balances = config.balances.len(),
        positions = config.positions.len(),
        "composer assembled"
    );
    Ok(composer)
}

fn build_venue(config: &VenueConfig) -> Result<Arc<dyn SwapVenue>, LaunchError> {
    match config.kind {
        VenueKindConfig::ConstantProduct => {
            let mut venue = ConstantProductVenue::new();
            for pool in &config.pools {
                venue.insert_pool(pool.token0, pool.token1, pool.fee, pool.address);
            }
            Ok(Arc::new(venue))
        }
        VenueKindConfig::FixedRate => {
            let mut venue = FixedRateVenue::new();
            for pool in &config.pools {
                venue.insert_pool(
                    pool.token0,
                    pool.token1,
                    pool.fee,
                    FixedRatePool {
                        address: pool.address,
                        rate_numerator: pool.rate_numerator,
                        rate_denominator: pool.rate_denominator,
                    },
                )?;
            }
            Ok(Arc::new(venue))
        }
    }
}
