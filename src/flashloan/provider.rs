use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::state::{StateError, WorldState};

use super::error::{FlashloanError, FlashloanResult};
use super::fee::{FeeMode, FeeRate, FeeResult, FlashTerms};

/// 向 provider 发起的借款请求。`context` 会原样出现在回调里。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashLoanRequest {
    pub initiator: Address,
    pub receiver: Address,
    pub asset: Address,
    pub amount: U256,
    pub context: u64,
}

/// provider 回调接收方时携带的参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashCallback {
    pub initiator: Address,
    pub asset: Address,
    pub amount: U256,
    pub fee: U256,
    pub context: u64,
}

pub trait FlashLoanReceiver {
    /// `caller` 是实际发起回调的账户，由接收方自行校验。
    fn on_flash_loan(
        &mut self,
        state: &mut WorldState,
        caller: Address,
        callback: &FlashCallback,
    ) -> FlashloanResult<()>;
}

pub trait FlashLoanProvider: Send + Sync {
    fn address(&self) -> Address;

    fn fee_rate(&self) -> FeeRate;

    fn fee_mode(&self) -> FeeMode;

    fn terms(&self, gross: U256) -> FeeResult<FlashTerms> {
        self.fee_rate().terms(gross, self.fee_mode())
    }

    /// 交付资金、回调接收方、收回欠款；任何一步失败都向上传播。
    fn flash_loan(
        &self,
        state: &mut WorldState,
        request: &FlashLoanRequest,
        receiver: &mut dyn FlashLoanReceiver,
    ) -> FlashloanResult<FlashTerms>;
}

/// 以自身账本余额放贷的参考 provider。
#[derive(Debug, Clone, Copy)]
pub struct ReserveFlashLender {
    address: Address,
    rate: FeeRate,
    mode: FeeMode,
}

impl ReserveFlashLender {
    pub fn new(address: Address, rate: FeeRate, mode: FeeMode) -> Self {
        Self {
            address,
            rate,
            mode,
        }
    }
}

impl FlashLoanProvider for ReserveFlashLender {
    fn address(&self) -> Address {
        self.address
    }

    fn fee_rate(&self) -> FeeRate {
        self.rate
    }

    fn fee_mode(&self) -> FeeMode {
        self.mode
    }

    fn flash_loan(
        &self,
        state: &mut WorldState,
        request: &FlashLoanRequest,
        receiver: &mut dyn FlashLoanReceiver,
    ) -> FlashloanResult<FlashTerms> {
        let terms = self.terms(request.amount)?;
        let before = state.balance_of(request.asset, self.address);
        if before < terms.delivered {
            return Err(FlashloanError::InsufficientReserve {
                provider: self.address,
                asset: request.asset,
                available: before,
                requested: terms.delivered,
            });
        }
        state.transfer(request.asset, self.address, request.receiver, terms.delivered)?;

        receiver.on_flash_loan(
            state,
            self.address,
            &FlashCallback {
                initiator: request.initiator,
                asset: request.asset,
                amount: terms.gross,
                fee: terms.fee,
                context: request.context,
            },
        )?;

        let not_repaid = || FlashloanError::NotRepaid {
            provider: self.address,
            asset: request.asset,
            owed: terms.owed,
        };
        state
            .transfer(request.asset, request.receiver, self.address, terms.owed)
            .map_err(|err| match err {
                StateError::InsufficientBalance { .. } => not_repaid(),
                other => FlashloanError::State(other),
            })?;
        let after = state.balance_of(request.asset, self.address);
        if after < before.saturating_add(terms.fee) {
            return Err(not_repaid());
        }

        debug!(
            target: "flashloan",
            provider = %self.address,
            asset = %request.asset,
            gross = %terms.gross,
            fee = %terms.fee,
            mode = self.mode.as_str(),
            "flash loan repaid"
        );
        Ok(terms)
    }
}
