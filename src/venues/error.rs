use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::state::StateError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VenueError {
    #[error("未注册的 provider id: {0}")]
    UnknownProvider(u8),
    #[error("provider id {0} 重复注册")]
    DuplicateProvider(u8),
    #[error("provider {provider_id} 下不存在池子 {token_in} -> {token_out} (fee={fee})")]
    PoolNotFound {
        provider_id: u8,
        token_in: Address,
        token_out: Address,
        fee: u32,
    },
    #[error("池子 {pool} 流动性不足: 储备 in={reserve_in} out={reserve_out} 请求 {requested}")]
    InsufficientLiquidity {
        pool: Address,
        reserve_in: U256,
        reserve_out: U256,
        requested: U256,
    },
    #[error("池子 {pool} 的 fee {fee} 不小于 1e6")]
    InvalidFee { pool: Address, fee: u32 },
    #[error("池子 {0} 配置非法: {1}")]
    InvalidPool(Address, String),
    #[error("兑换数量为零")]
    ZeroAmount,
    #[error("兑换计算溢出")]
    Overflow,
    #[error(transparent)]
    State(#[from] StateError),
}

pub type VenueResult<T> = Result<T, VenueError>;
