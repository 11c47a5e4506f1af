//! 闪电贷：费率换算、provider 契约以及回调期间的状态机。

mod error;
pub mod fee;
mod orchestrator;
mod provider;

pub use error::{FlashloanError, FlashloanResult};
pub use fee::{BPS_DENOMINATOR, FeeError, FeeMode, FeeRate, FeeResult, FlashTerms};
pub use orchestrator::{FlashLoanContext, FlashLoanOrchestrator, FlashPlan, FlashReceipt, FlashState};
pub use provider::{
    FlashCallback, FlashLoanProvider, FlashLoanReceiver, FlashLoanRequest, ReserveFlashLender,
};
