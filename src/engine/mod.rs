//! 路径解释器：按 hop 顺序调度 venue / lender，必要时通过闪电贷垫资。

mod composition;
mod error;
mod interpreter;

pub use composition::{Composition, FundingLeg, OutputLeg, classify};
pub use error::{EngineError, EngineResult, FailureCategory};
pub use interpreter::{ExecutionRequest, Interpreter, Settled};

#[cfg(test)]
mod tests;
