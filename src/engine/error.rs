use alloy_primitives::U256;
use thiserror::Error;

use crate::flashloan::{FeeError, FlashloanError};
use crate::lending::LendingError;
use crate::path::{ActionCode, Direction, PathError};
use crate::state::StateError;
use crate::venues::VenueError;

use super::composition::Composition;

/// 对外暴露的失败类别。所有失败都不可恢复，整笔事务丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    MalformedInput,
    SlippageViolation,
    /// 流动性、抵押或闪电贷归还不足。
    Liquidity,
    Authorization,
    Routing,
}

impl FailureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCategory::MalformedInput => "malformed-input",
            FailureCategory::SlippageViolation => "slippage",
            FailureCategory::Liquidity => "liquidity",
            FailureCategory::Authorization => "authorization",
            FailureCategory::Routing => "routing",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("路径解析失败: {0}")]
    Path(#[from] PathError),
    #[error("兑换失败: {0}")]
    Venue(#[from] VenueError),
    #[error("借贷操作失败: {0}")]
    Lending(#[from] LendingError),
    #[error("闪电贷处理失败: {0}")]
    Flashloan(#[from] FlashloanError),
    #[error("账本操作失败: {0}")]
    State(#[from] StateError),
    #[error("费用计算失败: {0}")]
    Fee(#[from] FeeError),
    #[error("路径不包含任何 hop")]
    EmptyPath,
    #[error("hop {index} 的操作码 {action} 与执行方向 {direction} 不符")]
    OrientationMismatch {
        index: usize,
        action: ActionCode,
        direction: Direction,
    },
    #[error("杠杆操作码 {action} 只能出现在第一个 hop，实际位于 hop {index}")]
    LeveragedHopNotFirst { index: usize, action: ActionCode },
    #[error("入口期望 {expected}，路径声明的是 {found}")]
    ActionMismatch {
        expected: Composition,
        found: Composition,
    },
    #[error("滑点超限 ({direction}): 结算 {settled}，限制 {limit}")]
    SlippageExceeded {
        direction: Direction,
        settled: U256,
        limit: U256,
    },
    #[error("{composition} 在 {direction} 方向下不支持 max 数量模式")]
    AmountModeUnsupported {
        composition: Composition,
        direction: Direction,
    },
    #[error("执行数量为零")]
    ZeroAmount,
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn category(&self) -> FailureCategory {
        match self {
            EngineError::Path(_) | EngineError::Fee(_) => FailureCategory::MalformedInput,
            EngineError::Venue(err) => venue_category(err),
            EngineError::Lending(err) => lending_category(err),
            EngineError::Flashloan(err) => flashloan_category(err),
            EngineError::State(_) => FailureCategory::Liquidity,
            EngineError::SlippageExceeded { .. } => FailureCategory::SlippageViolation,
            EngineError::EmptyPath
            | EngineError::OrientationMismatch { .. }
            | EngineError::LeveragedHopNotFirst { .. }
            | EngineError::ActionMismatch { .. }
            | EngineError::AmountModeUnsupported { .. }
            | EngineError::ZeroAmount => FailureCategory::MalformedInput,
        }
    }
}

fn venue_category(err: &VenueError) -> FailureCategory {
    match err {
        VenueError::PoolNotFound { .. }
        | VenueError::InsufficientLiquidity { .. }
        | VenueError::State(_) => FailureCategory::Liquidity,
        VenueError::UnknownProvider(_)
        | VenueError::DuplicateProvider(_)
        | VenueError::InvalidFee { .. }
        | VenueError::InvalidPool(..)
        | VenueError::ZeroAmount
        | VenueError::Overflow => FailureCategory::MalformedInput,
    }
}

fn lending_category(err: &LendingError) -> FailureCategory {
    match err {
        LendingError::InsufficientCollateral { .. }
        | LendingError::InsufficientLiquidity { .. }
        | LendingError::Unhealthy { .. }
        | LendingError::State(_) => FailureCategory::Liquidity,
        LendingError::UnknownLender(_)
        | LendingError::DuplicateLender(_)
        | LendingError::UnsupportedAsset { .. }
        | LendingError::InvalidLtv { .. }
        | LendingError::Overflow => FailureCategory::MalformedInput,
    }
}

fn flashloan_category(err: &FlashloanError) -> FailureCategory {
    match err {
        FlashloanError::Fee(_) => FailureCategory::MalformedInput,
        FlashloanError::State(_)
        | FlashloanError::InsufficientReserve { .. }
        | FlashloanError::RepaymentShortfall { .. }
        | FlashloanError::NotRepaid { .. }
        | FlashloanError::ContinuationFailed => FailureCategory::Liquidity,
        FlashloanError::UnauthorizedCallback { .. }
        | FlashloanError::UnauthorizedInitiator { .. }
        | FlashloanError::ContextMismatch(_)
        | FlashloanError::Reentrancy
        | FlashloanError::CallbackMissing => FailureCategory::Authorization,
    }
}
