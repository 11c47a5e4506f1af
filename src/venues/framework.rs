use alloy_primitives::{Address, U256};
use serde::Deserialize;

use super::error::VenueResult;

/// fee 字段的单位：百万分之一（pip）。
pub const FEE_DENOMINATOR: u64 = 1_000_000;

/// 单跳兑换请求的最小上下文。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapLeg {
    pub provider_id: u8,
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
}

/// 池子当前储备，按兑换方向排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

/// 一次兑换（或报价）的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapFill {
    pub pool: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VenueKind {
    ConstantProduct,
    FixedRate,
}

impl VenueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueKind::ConstantProduct => "constant-product",
            VenueKind::FixedRate => "fixed-rate",
        }
    }
}

/// 池子的无序键：同一对代币 + fee 只对应一个池子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
}

impl PoolKey {
    pub fn new(a: Address, b: Address, fee: u32) -> Self {
        if a <= b {
            Self {
                token0: a,
                token1: b,
                fee,
            }
        } else {
            Self {
                token0: b,
                token1: a,
                fee,
            }
        }
    }

    pub fn for_leg(leg: &SwapLeg) -> Self {
        Self::new(leg.token_in, leg.token_out, leg.fee)
    }
}

/// 兑换 venue 的统一调用契约。
///
/// venue 本身无状态：储备即池子地址在账本中的余额，由 `VenueBook` 负责读写。
pub trait SwapVenue: Send + Sync {
    fn kind(&self) -> VenueKind;

    /// 解析该跳对应的池子地址。
    fn pool(&self, leg: &SwapLeg) -> VenueResult<Address>;

    fn amount_out(&self, pool: Address, reserves: Reserves, leg: &SwapLeg, amount_in: U256)
    -> VenueResult<U256>;

    fn amount_in(&self, pool: Address, reserves: Reserves, leg: &SwapLeg, amount_out: U256)
    -> VenueResult<U256>;
}
