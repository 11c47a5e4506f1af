use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use super::error::{VenueError, VenueResult};
use super::framework::{FEE_DENOMINATOR, PoolKey, Reserves, SwapLeg, SwapVenue, VenueKind};

/// x * y = k 池子，fee 以 pip 计并从输入侧扣除。
#[derive(Debug, Default)]
pub struct ConstantProductVenue {
    pools: HashMap<PoolKey, Address>,
}

impl ConstantProductVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pool(mut self, token_a: Address, token_b: Address, fee: u32, pool: Address) -> Self {
        self.insert_pool(token_a, token_b, fee, pool);
        self
    }

    pub fn insert_pool(&mut self, token_a: Address, token_b: Address, fee: u32, pool: Address) {
        self.pools.insert(PoolKey::new(token_a, token_b, fee), pool);
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

fn fee_multiplier(pool: Address, fee: u32) -> VenueResult<U256> {
    let fee = u64::from(fee);
    if fee >= FEE_DENOMINATOR {
        return Err(VenueError::InvalidFee {
            pool,
            fee: fee as u32,
        });
    }
    Ok(U256::from(FEE_DENOMINATOR - fee))
}

impl SwapVenue for ConstantProductVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::ConstantProduct
    }

    fn pool(&self, leg: &SwapLeg) -> VenueResult<Address> {
        self.pools
            .get(&PoolKey::for_leg(leg))
            .copied()
            .ok_or(VenueError::PoolNotFound {
                provider_id: leg.provider_id,
                token_in: leg.token_in,
                token_out: leg.token_out,
                fee: leg.fee,
            })
    }

    fn amount_out(
        &self,
        pool: Address,
        reserves: Reserves,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> VenueResult<U256> {
        let insufficient = || VenueError::InsufficientLiquidity {
            pool,
            reserve_in: reserves.reserve_in,
            reserve_out: reserves.reserve_out,
            requested: amount_in,
        };
        if amount_in.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if reserves.reserve_in.is_zero() || reserves.reserve_out.is_zero() {
            return Err(insufficient());
        }

        let in_after_fee = amount_in
            .checked_mul(fee_multiplier(pool, leg.fee)?)
            .ok_or(VenueError::Overflow)?;
        let numerator = in_after_fee
            .checked_mul(reserves.reserve_out)
            .ok_or(VenueError::Overflow)?;
        let denominator = reserves
            .reserve_in
            .checked_mul(U256::from(FEE_DENOMINATOR))
            .and_then(|scaled| scaled.checked_add(in_after_fee))
            .ok_or(VenueError::Overflow)?;

        let out = numerator / denominator;
        if out.is_zero() {
            return Err(insufficient());
        }
        Ok(out)
    }

    fn amount_in(
        &self,
        pool: Address,
        reserves: Reserves,
        leg: &SwapLeg,
        amount_out: U256,
    ) -> VenueResult<U256> {
        if amount_out.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if reserves.reserve_in.is_zero() || amount_out >= reserves.reserve_out {
            return Err(VenueError::InsufficientLiquidity {
                pool,
                reserve_in: reserves.reserve_in,
                reserve_out: reserves.reserve_out,
                requested: amount_out,
            });
        }

        let numerator = reserves
            .reserve_in
            .checked_mul(amount_out)
            .and_then(|value| value.checked_mul(U256::from(FEE_DENOMINATOR)))
            .ok_or(VenueError::Overflow)?;
        let denominator = (reserves.reserve_out - amount_out)
            .checked_mul(fee_multiplier(pool, leg.fee)?)
            .ok_or(VenueError::Overflow)?;

        // 向上取整，保证池子收到的输入足够
        Ok(numerator / denominator + U256::from(1))
    }
}
