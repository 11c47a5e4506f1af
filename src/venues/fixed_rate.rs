use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use super::error::{VenueError, VenueResult};
use super::framework::{FEE_DENOMINATOR, PoolKey, Reserves, SwapLeg, SwapVenue, VenueKind};

/// 固定汇率池（挂钩资产之间的兑换）。`rate` 表示 1 单位 token0 可换的 token1 数量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRatePool {
    pub address: Address,
    pub rate_numerator: u64,
    pub rate_denominator: u64,
}

#[derive(Debug, Default)]
pub struct FixedRateVenue {
    pools: HashMap<PoolKey, FixedRatePool>,
}

impl FixedRateVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pool(
        &mut self,
        token0: Address,
        token1: Address,
        fee: u32,
        pool: FixedRatePool,
    ) -> VenueResult<()> {
        if pool.rate_numerator == 0 || pool.rate_denominator == 0 {
            return Err(VenueError::InvalidPool(
                pool.address,
                "汇率分子分母必须为正".to_string(),
            ));
        }
        let key = PoolKey::new(token0, token1, fee);
        // 配置里的 rate 以 token0 -> token1 给出；键排序后方向可能翻转
        let pool = if key.token0 == token0 {
            pool
        } else {
            FixedRatePool {
                address: pool.address,
                rate_numerator: pool.rate_denominator,
                rate_denominator: pool.rate_numerator,
            }
        };
        self.pools.insert(key, pool);
        Ok(())
    }

    fn lookup(&self, leg: &SwapLeg) -> VenueResult<(FixedRatePool, bool)> {
        let key = PoolKey::for_leg(leg);
        let pool = self.pools.get(&key).copied().ok_or(VenueError::PoolNotFound {
            provider_id: leg.provider_id,
            token_in: leg.token_in,
            token_out: leg.token_out,
            fee: leg.fee,
        })?;
        Ok((pool, key.token0 == leg.token_in))
    }

    /// 按方向给出 (numerator, denominator)。
    fn oriented_rate(&self, leg: &SwapLeg) -> VenueResult<(U256, U256)> {
        let (pool, forward) = self.lookup(leg)?;
        let (num, den) = if forward {
            (pool.rate_numerator, pool.rate_denominator)
        } else {
            (pool.rate_denominator, pool.rate_numerator)
        };
        Ok((U256::from(num), U256::from(den)))
    }
}

impl SwapVenue for FixedRateVenue {
    fn kind(&self) -> VenueKind {
        VenueKind::FixedRate
    }

    fn pool(&self, leg: &SwapLeg) -> VenueResult<Address> {
        self.lookup(leg).map(|(pool, _)| pool.address)
    }

    fn amount_out(
        &self,
        pool: Address,
        reserves: Reserves,
        leg: &SwapLeg,
        amount_in: U256,
    ) -> VenueResult<U256> {
        if amount_in.is_zero() {
            return Err(VenueError::ZeroAmount);
        }
        if u64::from(leg.fee) >= FEE_DENOMINATOR {
            return Err(VenueError::InvalidFee { pool, fee: leg.fee });
        }
        let (num, den) = self.oriented_rate(leg)?;
        let multiplier = U256::from(FEE_DENOMINATOR - u64::from(leg.fee));
        let out = amount_in
            .checked_mul(multiplier)
            .and_then(|value| value.checked_mul(num))
            .ok_or(VenueError::Overflow)?
            / (U256::from(FEE_DENOMINATOR) * den);

        if out.is_zero() || out > reserves.reserve_out {
            return Err(VenueError::InsufficientLiquidity {
                pool,
                reserve_in: reserves.reserve_in,
                reserve_out: reserves.reserve_out,
                requested: amount_in,
            });
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
        if u64::from(leg.fee) >= FEE_DENOMINATOR {
            return Err(VenueError::InvalidFee { pool, fee: leg.fee });
        }
        if amount_out > reserves.reserve_out {
            return Err(VenueError::InsufficientLiquidity {
                pool,
                reserve_in: reserves.reserve_in,
                reserve_out: reserves.reserve_out,
                requested: amount_out,
            });
        }
        let (num, den) = self.oriented_rate(leg)?;
        let multiplier = U256::from(FEE_DENOMINATOR - u64::from(leg.fee));
        let numerator = amount_out
            .checked_mul(U256::from(FEE_DENOMINATOR))
            .and_then(|value| value.checked_mul(den))
            .ok_or(VenueError::Overflow)?;
        let denominator = multiplier * num;
        Ok(numerator.div_ceil(denominator))
    }
}
