use alloy_primitives::Address;
use thiserror::Error;

use crate::engine::{EngineError, FailureCategory};
use crate::lending::LendingError;
use crate::state::StateError;

use super::selector::OperationId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{caller} 不是管理员")]
    NotAdministrator { caller: Address },
    #[error("操作 {operation} 已由 {owner} 持有")]
    AlreadyOwned {
        operation: OperationId,
        owner: Address,
    },
    #[error("操作 {0} 尚无持有者，无法替换")]
    ReplaceUnowned(OperationId),
    #[error("操作 {operation} 已由同一实现 {implementation} 持有")]
    ReplaceSameImplementation {
        operation: OperationId,
        implementation: Address,
    },
    #[error("add / replace 必须提供模块实现")]
    MissingImplementation,
    #[error("remove 不能携带模块实现 ({0})")]
    RemoveWithImplementation(Address),
    #[error("变更未列出任何操作")]
    EmptyCut,
    #[error("非法的操作标识: {0}")]
    InvalidOperationId(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    pub fn category(&self) -> FailureCategory {
        match self {
            RegistryError::NotAdministrator { .. } => FailureCategory::Authorization,
            _ => FailureCategory::MalformedInput,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("无法识别的操作: {}", describe_selector(.selector))]
    UnrecognizedOperation { selector: Option<OperationId> },
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Lending(#[from] LendingError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("操作 {operation} 的 calldata 非法: {reason}")]
    MalformedCalldata {
        operation: OperationId,
        reason: &'static str,
    },
}

pub type DispatchResult<T> = Result<T, DispatchError>;

fn describe_selector(selector: &Option<OperationId>) -> String {
    selector
        .map(|id| id.to_string())
        .unwrap_or_else(|| "<calldata 不足 4 字节>".to_string())
}

impl DispatchError {
    pub fn category(&self) -> FailureCategory {
        match self {
            DispatchError::UnrecognizedOperation { .. } => FailureCategory::Routing,
            DispatchError::Registry(err) => err.category(),
            DispatchError::Engine(err) => err.category(),
            DispatchError::Lending(err) => EngineError::Lending(err.clone()).category(),
            DispatchError::State(_) => FailureCategory::Liquidity,
            DispatchError::MalformedCalldata { .. } => FailureCategory::MalformedInput,
        }
    }
}
