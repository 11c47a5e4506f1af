//! 兑换 venue：按 provider id 选择池子类型，储备直接读写世界状态中池子地址的余额。

pub mod constant_product;
mod error;
pub mod fixed_rate;
pub mod framework;

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::trace;

use crate::state::{Settlement, StateError, WorldState};

pub use constant_product::ConstantProductVenue;
pub use error::{VenueError, VenueResult};
pub use fixed_rate::{FixedRatePool, FixedRateVenue};
pub use framework::{FEE_DENOMINATOR, PoolKey, Reserves, SwapFill, SwapLeg, SwapVenue, VenueKind};

/// provider id -> venue 的注册表。
#[derive(Default, Clone)]
pub struct VenueBook {
    venues: BTreeMap<u8, Arc<dyn SwapVenue>>,
}

impl std::fmt::Debug for VenueBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<(u8, &'static str)> = self
            .venues
            .iter()
            .map(|(id, venue)| (*id, venue.kind().as_str()))
            .collect();
        f.debug_struct("VenueBook").field("venues", &kinds).finish()
    }
}

impl VenueBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider_id: u8, venue: Arc<dyn SwapVenue>) -> VenueResult<()> {
        if self.venues.contains_key(&provider_id) {
            return Err(VenueError::DuplicateProvider(provider_id));
        }
        self.venues.insert(provider_id, venue);
        Ok(())
    }

    pub fn venue(&self, provider_id: u8) -> VenueResult<&Arc<dyn SwapVenue>> {
        self.venues
            .get(&provider_id)
            .ok_or(VenueError::UnknownProvider(provider_id))
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.venues.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }

    fn resolve(&self, state: &WorldState, leg: &SwapLeg) -> VenueResult<(&dyn SwapVenue, Address, Reserves)> {
        let venue = self.venue(leg.provider_id)?;
        let pool = venue.pool(leg)?;
        let reserves = Reserves {
            reserve_in: state.balance_of(leg.token_in, pool),
            reserve_out: state.balance_of(leg.token_out, pool),
        };
        Ok((venue.as_ref(), pool, reserves))
    }

    /// 只读报价：给定输入，求输出。
    pub fn quote_exact_in(&self, state: &WorldState, leg: &SwapLeg, amount_in: U256) -> VenueResult<SwapFill> {
        let (venue, pool, reserves) = self.resolve(state, leg)?;
        let amount_out = venue.amount_out(pool, reserves, leg, amount_in)?;
        Ok(SwapFill {
            pool,
            amount_in,
            amount_out,
        })
    }

    /// 只读报价：给定输出，求所需输入。
    pub fn quote_exact_out(&self, state: &WorldState, leg: &SwapLeg, amount_out: U256) -> VenueResult<SwapFill> {
        let (venue, pool, reserves) = self.resolve(state, leg)?;
        let amount_in = venue.amount_in(pool, reserves, leg, amount_out)?;
        Ok(SwapFill {
            pool,
            amount_in,
            amount_out,
        })
    }

    pub fn swap_exact_in(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> VenueResult<SwapFill> {
        let fill = self.quote_exact_in(state, leg, amount_in)?;
        apply_fill(state, settlement, leg, &fill)?;
        Ok(fill)
    }

    /// 先交付输出，所需输入记为引擎欠款。
    pub fn swap_exact_out(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        leg: &SwapLeg,
        amount_out: U256,
    ) -> VenueResult<SwapFill> {
        let fill = self.quote_exact_out(state, leg, amount_out)?;
        apply_fill(state, settlement, leg, &fill)?;
        Ok(fill)
    }
}

fn apply_fill(
    state: &mut WorldState,
    settlement: &mut Settlement,
    leg: &SwapLeg,
    fill: &SwapFill,
) -> VenueResult<()> {
    state
        .debit(leg.token_out, fill.pool, fill.amount_out)
        .map_err(|err| match err {
            StateError::InsufficientBalance { available, .. } => VenueError::InsufficientLiquidity {
                pool: fill.pool,
                reserve_in: state.balance_of(leg.token_in, fill.pool),
                reserve_out: available,
                requested: fill.amount_out,
            },
            other => VenueError::State(other),
        })?;
    settlement.credit(leg.token_out, fill.amount_out)?;
    settlement.debit(leg.token_in, fill.amount_in)?;
    state.credit(leg.token_in, fill.pool, fill.amount_in)?;
    trace!(
        target: "venues",
        pool = %fill.pool,
        token_in = %leg.token_in,
        token_out = %leg.token_out,
        amount_in = %fill.amount_in,
        amount_out = %fill.amount_out,
        "pool reserves updated"
    );
    Ok(())
}
