use alloy_primitives::{Address, U256};
use tracing::{debug, warn};

use crate::monitoring::events;
use crate::path::{Direction, Path};
use crate::state::{Settlement, WorldState};

use super::error::{FlashloanError, FlashloanResult};
use super::fee::FlashTerms;
use super::provider::{FlashCallback, FlashLoanProvider, FlashLoanReceiver, FlashLoanRequest};

/// 单笔闪电贷在回调期间需要的全部信息，随回调显式传给后续操作。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashLoanContext {
    /// 原始调用方（仓位所有人）。
    pub user: Address,
    pub engine: Address,
    pub provider: Address,
    pub asset: Address,
    pub terms: FlashTerms,
    pub path: Path,
    pub direction: Direction,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlashState {
    #[default]
    Idle,
    Borrowing(FlashLoanContext),
    Repaying(FlashLoanContext),
}

impl FlashState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashState::Idle => "idle",
            FlashState::Borrowing(_) => "borrowing",
            FlashState::Repaying(_) => "repaying",
        }
    }
}

/// 发起闪电贷时由调用方给出的参数。
#[derive(Debug, Clone)]
pub struct FlashPlan {
    pub user: Address,
    pub asset: Address,
    pub gross: U256,
    pub path: Path,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashReceipt {
    pub provider: Address,
    pub asset: Address,
    pub terms: FlashTerms,
    pub nonce: u64,
}

/// `Idle → Borrowing → Repaying → Idle` 状态机。
#[derive(Debug)]
pub struct FlashLoanOrchestrator {
    engine: Address,
    state: FlashState,
    nonce: u64,
}

impl FlashLoanOrchestrator {
    pub fn new(engine: Address) -> Self {
        Self {
            engine,
            state: FlashState::Idle,
            nonce: 0,
        }
    }

    pub fn engine(&self) -> Address {
        self.engine
    }

    pub fn state(&self) -> &FlashState {
        &self.state
    }

    /// 已发起的闪电贷次数，也是最近一次回调使用的 nonce。
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// 借入 `plan.gross`，在回调中以显式上下文运行 `continuation`，随后归还。
    ///
    /// 后续操作的错误原样返回；无论成败，状态机都回到 `Idle`。
    pub fn initiate<E, F>(
        &mut self,
        world: &mut WorldState,
        settlement: &mut Settlement,
        provider: &dyn FlashLoanProvider,
        plan: FlashPlan,
        continuation: F,
    ) -> Result<FlashReceipt, E>
    where
        E: From<FlashloanError>,
        F: FnOnce(&mut WorldState, &mut Settlement, &FlashLoanContext) -> Result<(), E>,
    {
        if self.state != FlashState::Idle {
            return Err(FlashloanError::Reentrancy.into());
        }
        let terms = provider.terms(plan.gross).map_err(FlashloanError::from)?;
        self.nonce += 1;
        let context = FlashLoanContext {
            user: plan.user,
            engine: self.engine,
            provider: provider.address(),
            asset: plan.asset,
            terms,
            path: plan.path,
            direction: plan.direction,
            nonce: self.nonce,
        };
        let request = FlashLoanRequest {
            initiator: self.engine,
            receiver: self.engine,
            asset: context.asset,
            amount: terms.gross,
            context: context.nonce,
        };
        debug!(
            target: "flashloan",
            provider = %context.provider,
            asset = %context.asset,
            gross = %terms.gross,
            fee = %terms.fee,
            nonce = context.nonce,
            "flash loan requested"
        );
        self.state = FlashState::Borrowing(context);

        let (outcome, failure, completed) = {
            let mut receiver = CallbackReceiver {
                engine: self.engine,
                provider: provider.address(),
                flash_state: &mut self.state,
                settlement,
                continuation: Some(continuation),
                failure: None,
            };
            let outcome = provider.flash_loan(world, &request, &mut receiver);
            let completed = matches!(receiver.flash_state, FlashState::Repaying(_));
            (outcome, receiver.failure.take(), completed)
        };
        self.state = FlashState::Idle;

        match outcome {
            Ok(charged) => {
                if !completed {
                    return Err(FlashloanError::CallbackMissing.into());
                }
                if charged != terms {
                    return Err(FlashloanError::ContextMismatch("provider charged different terms").into());
                }
                events::flashloan_completed(&provider.address(), &request.asset, &terms);
                Ok(FlashReceipt {
                    provider: provider.address(),
                    asset: request.asset,
                    terms,
                    nonce: request.context,
                })
            }
            Err(err) => {
                warn!(
                    target: "flashloan",
                    provider = %provider.address(),
                    asset = %request.asset,
                    error = %err,
                    "flash loan aborted"
                );
                Err(failure.unwrap_or_else(|| err.into()))
            }
        }
    }
}

struct CallbackReceiver<'a, F, E> {
    engine: Address,
    provider: Address,
    flash_state: &'a mut FlashState,
    settlement: &'a mut Settlement,
    continuation: Option<F>,
    failure: Option<E>,
}

impl<F, E> FlashLoanReceiver for CallbackReceiver<'_, F, E>
where
    F: FnOnce(&mut WorldState, &mut Settlement, &FlashLoanContext) -> Result<(), E>,
{
    fn on_flash_loan(
        &mut self,
        world: &mut WorldState,
        caller: Address,
        callback: &FlashCallback,
    ) -> FlashloanResult<()> {
        if caller != self.provider {
            return Err(FlashloanError::UnauthorizedCallback {
                expected: self.provider,
                caller,
            });
        }
        if callback.initiator != self.engine {
            return Err(FlashloanError::UnauthorizedInitiator {
                expected: self.engine,
                initiator: callback.initiator,
            });
        }
        let context = match &*self.flash_state {
            FlashState::Borrowing(context) => context.clone(),
            _ => return Err(FlashloanError::Reentrancy),
        };
        if callback.context != context.nonce {
            return Err(FlashloanError::ContextMismatch("nonce"));
        }
        if callback.asset != context.asset {
            return Err(FlashloanError::ContextMismatch("asset"));
        }
        if callback.amount != context.terms.gross || callback.fee != context.terms.fee {
            return Err(FlashloanError::ContextMismatch("amount"));
        }
        *self.flash_state = FlashState::Repaying(context.clone());

        let asset = context.asset;
        let terms = context.terms;
        world.debit(asset, self.engine, terms.delivered)?;
        self.settlement.credit(asset, terms.delivered)?;

        let continuation = self.continuation.take().ok_or(FlashloanError::Reentrancy)?;
        if let Err(err) = continuation(world, self.settlement, &context) {
            self.failure = Some(err);
            return Err(FlashloanError::ContinuationFailed);
        }

        let held = self.settlement.held(asset);
        if held < terms.owed {
            return Err(FlashloanError::RepaymentShortfall {
                asset,
                held,
                owed: terms.owed,
            });
        }
        self.settlement.spend_held(asset, terms.owed)?;
        world.credit(asset, self.engine, terms.owed)?;
        Ok(())
    }
}
