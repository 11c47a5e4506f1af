use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::state::StateError;

use super::fee::FeeError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlashloanError {
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("闪电贷 provider {provider} 的 {asset} 储备不足: 可用 {available}，请求 {requested}")]
    InsufficientReserve {
        provider: Address,
        asset: Address,
        available: U256,
        requested: U256,
    },
    #[error("回调来源非法: 期望 {expected}，实际 {caller}")]
    UnauthorizedCallback { expected: Address, caller: Address },
    #[error("回调发起人非法: 期望 {expected}，实际 {initiator}")]
    UnauthorizedInitiator { expected: Address, initiator: Address },
    #[error("回调参数与闪电贷上下文不一致: {0}")]
    ContextMismatch(&'static str),
    #[error("闪电贷归还不足: 资产 {asset} 持有 {held}，应还 {owed}")]
    RepaymentShortfall {
        asset: Address,
        held: U256,
        owed: U256,
    },
    #[error("provider {provider} 未收到足额归还: 资产 {asset} 应还 {owed}")]
    NotRepaid {
        provider: Address,
        asset: Address,
        owed: U256,
    },
    #[error("闪电贷重入")]
    Reentrancy,
    #[error("provider 未触发回调")]
    CallbackMissing,
    #[error("闪电贷回调内的后续操作失败")]
    ContinuationFailed,
}

pub type FlashloanResult<T> = Result<T, FlashloanError>;
