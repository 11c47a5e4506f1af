use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use super::error::{LendingError, LendingResult};
use super::LendingMarket;
use crate::state::{Position, Settlement, WorldState};

const LTV_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetConfig {
    /// 以统一记账单位计的单价。
    pub price: U256,
    /// 抵押率（bps）。为 0 时该资产只能借、不能计入抵押价值。
    pub ltv_bps: u16,
}

/// 资金池式借贷市场：流动性即市场地址在账本中的余额，仓位存放在世界状态里。
///
/// 不计利息，不做清算；每次 withdraw / borrow 之后校验
/// `Σ collateral * price * ltv ≥ Σ debt * price`。
#[derive(Debug, Clone)]
pub struct PooledLendingMarket {
    id: u8,
    address: Address,
    assets: BTreeMap<Address, AssetConfig>,
}

impl PooledLendingMarket {
    pub fn new(id: u8, address: Address) -> Self {
        Self {
            id,
            address,
            assets: BTreeMap::new(),
        }
    }

    pub fn with_asset(mut self, asset: Address, config: AssetConfig) -> LendingResult<Self> {
        self.list_asset(asset, config)?;
        Ok(self)
    }

    pub fn list_asset(&mut self, asset: Address, config: AssetConfig) -> LendingResult<()> {
        if u64::from(config.ltv_bps) > LTV_DENOMINATOR {
            return Err(LendingError::InvalidLtv {
                asset,
                ltv_bps: config.ltv_bps,
            });
        }
        self.assets.insert(asset, config);
        Ok(())
    }

    fn config(&self, asset: Address) -> LendingResult<AssetConfig> {
        self.assets
            .get(&asset)
            .copied()
            .ok_or(LendingError::UnsupportedAsset {
                market: self.address,
                asset,
            })
    }

    fn release(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()> {
        let available = state.balance_of(asset, self.address);
        if available < amount {
            return Err(LendingError::InsufficientLiquidity {
                market: self.address,
                asset,
                available,
                requested: amount,
            });
        }
        state.debit(asset, self.address, amount)?;
        settlement.credit(asset, amount)?;
        Ok(())
    }

    fn absorb(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()> {
        settlement.debit(asset, amount)?;
        state.credit(asset, self.address, amount)?;
        Ok(())
    }

    fn ensure_healthy(&self, state: &WorldState, user: Address) -> LendingResult<()> {
        let mut collateral_value = U256::ZERO;
        let mut debt_value = U256::ZERO;
        for (asset, position) in state.positions_of(self.address, user) {
            let config = self.config(asset)?;
            let weighted = position
                .collateral
                .checked_mul(config.price)
                .and_then(|value| value.checked_mul(U256::from(config.ltv_bps)))
                .ok_or(LendingError::Overflow)?
                / U256::from(LTV_DENOMINATOR);
            collateral_value = collateral_value
                .checked_add(weighted)
                .ok_or(LendingError::Overflow)?;
            let owed = position
                .debt
                .checked_mul(config.price)
                .ok_or(LendingError::Overflow)?;
            debt_value = debt_value.checked_add(owed).ok_or(LendingError::Overflow)?;
        }
        if debt_value > collateral_value {
            return Err(LendingError::Unhealthy {
                user,
                collateral_value,
                debt_value,
            });
        }
        Ok(())
    }
}

impl LendingMarket for PooledLendingMarket {
    fn id(&self) -> u8 {
        self.id
    }

    fn address(&self) -> Address {
        self.address
    }

    fn supply(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()> {
        self.config(asset)?;
        self.absorb(state, settlement, asset, amount)?;
        let mut position = state.position(self.address, user, asset);
        position.collateral = position
            .collateral
            .checked_add(amount)
            .ok_or(LendingError::Overflow)?;
        state.set_position(self.address, user, asset, position);
        debug!(target: "lending", market = %self.address, %user, %asset, %amount, "supply");
        Ok(())
    }

    fn withdraw(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()> {
        self.config(asset)?;
        let mut position = state.position(self.address, user, asset);
        if position.collateral < amount {
            return Err(LendingError::InsufficientCollateral {
                asset,
                available: position.collateral,
                requested: amount,
            });
        }
        position.collateral -= amount;
        state.set_position(self.address, user, asset, position);
        self.ensure_healthy(state, user)?;
        self.release(state, settlement, asset, amount)?;
        debug!(target: "lending", market = %self.address, %user, %asset, %amount, "withdraw");
        Ok(())
    }

    fn borrow(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()> {
        self.config(asset)?;
        let mut position = state.position(self.address, user, asset);
        position.debt = position
            .debt
            .checked_add(amount)
            .ok_or(LendingError::Overflow)?;
        state.set_position(self.address, user, asset, position);
        self.ensure_healthy(state, user)?;
        self.release(state, settlement, asset, amount)?;
        debug!(target: "lending", market = %self.address, %user, %asset, %amount, "borrow");
        Ok(())
    }

    fn repay(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<U256> {
        self.config(asset)?;
        let position = state.position(self.address, user, asset);
        let repaid = amount.min(position.debt);
        self.absorb(state, settlement, asset, repaid)?;
        state.set_position(
            self.address,
            user,
            asset,
            Position {
                collateral: position.collateral,
                debt: position.debt - repaid,
            },
        );
        debug!(
            target: "lending",
            market = %self.address,
            %user,
            %asset,
            requested = %amount,
            %repaid,
            "repay"
        );
        Ok(repaid)
    }

    fn collateral_of(&self, state: &WorldState, user: Address, asset: Address) -> U256 {
        state.position(self.address, user, asset).collateral
    }

    fn debt_of(&self, state: &WorldState, user: Address, asset: Address) -> U256 {
        state.position(self.address, user, asset).debt
    }
}
