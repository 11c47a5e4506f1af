use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::state::StateError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LendingError {
    #[error("未注册的 lender id: {0}")]
    UnknownLender(u8),
    #[error("lender id {0} 重复注册")]
    DuplicateLender(u8),
    #[error("市场 {market} 不支持资产 {asset}")]
    UnsupportedAsset { market: Address, asset: Address },
    #[error("抵押不足: 资产 {asset} 可取 {available}，请求 {requested}")]
    InsufficientCollateral {
        asset: Address,
        available: U256,
        requested: U256,
    },
    #[error("市场 {market} 资产 {asset} 流动性不足: 可用 {available}，请求 {requested}")]
    InsufficientLiquidity {
        market: Address,
        asset: Address,
        available: U256,
        requested: U256,
    },
    #[error("仓位 {user} 健康度不足: 抵押价值 {collateral_value} < 债务价值 {debt_value}")]
    Unhealthy {
        user: Address,
        collateral_value: U256,
        debt_value: U256,
    },
    #[error("资产 {asset} 的 ltv {ltv_bps} 超过 10000")]
    InvalidLtv { asset: Address, ltv_bps: u16 },
    #[error("借贷计算溢出")]
    Overflow,
    #[error(transparent)]
    State(#[from] StateError),
}

pub type LendingResult<T> = Result<T, LendingError>;
