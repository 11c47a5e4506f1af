use alloy_primitives::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("余额不足: token={token} holder={holder} 可用 {available} 需要 {required}")]
    InsufficientBalance {
        token: Address,
        holder: Address,
        available: U256,
        required: U256,
    },
    #[error("结算账户持有不足: token={token} 持有 {held} 需要 {required}")]
    InsufficientHeld {
        token: Address,
        held: U256,
        required: U256,
    },
    #[error("余额运算溢出: token={token} holder={holder}")]
    Overflow { token: Address, holder: Address },
}

pub type StateResult<T> = Result<T, StateError>;
