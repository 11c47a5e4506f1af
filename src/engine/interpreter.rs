use std::sync::Arc;

use alloy_primitives::{Address, U256};
use tracing::{debug, info};

use crate::flashloan::{FlashLoanOrchestrator, FlashLoanProvider, FlashPlan, FlashReceipt};
use crate::lending::{LenderBook, LendingMarket};
use crate::monitoring::events;
use crate::path::{Direction, ModeFlag, Path};
use crate::state::{Settlement, SettlementReport, WorldState};
use crate::venues::{SwapFill, SwapLeg, VenueBook};

use super::composition::{Composition, FundingLeg, OutputLeg, classify};
use super::error::{EngineError, EngineResult};

/// 一次执行请求。`amount` / `limit` 的含义取决于方向与组合类型。
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub caller: Address,
    pub path: Path,
    pub amount: U256,
    pub limit: U256,
    pub direction: Direction,
}

/// 执行结果。`amount` 在 exact-in 下是输出，在 exact-out 下是输入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settled {
    pub amount: U256,
    pub composition: Composition,
    pub direction: Direction,
    pub hops: Vec<SwapFill>,
    pub flashloan: Option<FlashReceipt>,
    pub report: SettlementReport,
}

/// 路径解释器：本身无状态，所有副作用都落在传入的 `WorldState` 上。
pub struct Interpreter<'a> {
    engine: Address,
    venues: &'a VenueBook,
    lenders: &'a LenderBook,
    flash: &'a dyn FlashLoanProvider,
}

/// 闪电贷回调内产生的中间结果。
#[derive(Debug, Default)]
struct LeveragedOutcome {
    hops: Vec<SwapFill>,
    swapped: U256,
    funded: U256,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        engine: Address,
        venues: &'a VenueBook,
        lenders: &'a LenderBook,
        flash: &'a dyn FlashLoanProvider,
    ) -> Self {
        Self {
            engine,
            venues,
            lenders,
            flash,
        }
    }

    pub fn engine(&self) -> Address {
        self.engine
    }

    /// 在状态副本上模拟整条兑换链，返回逐跳成交与最终游标。
    ///
    /// 同一个池子在路径中出现多次时，后续 hop 看到的是前面 hop 之后的储备。
    pub fn quote(
        &self,
        state: &WorldState,
        path: &Path,
        direction: Direction,
        amount: U256,
    ) -> EngineResult<(Vec<SwapFill>, U256)> {
        let mut scratch = state.clone();
        let mut settlement = Settlement::new(self.engine);
        self.walk_hops(&mut scratch, &mut settlement, path, direction, amount, false)
    }

    /// 执行一条路径。`orchestrator` 由调用方持有并跨调用复用，
    /// 闪电贷的 nonce 与重入保护都以它为准。
    pub fn execute(
        &self,
        state: &mut WorldState,
        orchestrator: &mut FlashLoanOrchestrator,
        request: &ExecutionRequest,
    ) -> EngineResult<Settled> {
        let composition = classify(&request.path, request.direction)?;
        self.run(state, orchestrator, request, composition)
    }

    /// 入口函数使用：路径声明的组合必须与入口一致。
    pub fn execute_as(
        &self,
        state: &mut WorldState,
        orchestrator: &mut FlashLoanOrchestrator,
        request: &ExecutionRequest,
        expected: Composition,
    ) -> EngineResult<Settled> {
        let found = classify(&request.path, request.direction)?;
        if found != expected {
            return Err(EngineError::ActionMismatch { expected, found });
        }
        self.run(state, orchestrator, request, found)
    }

    #[cfg_attr(feature = "hotpath", hotpath::measure)]
    fn run(
        &self,
        state: &mut WorldState,
        orchestrator: &mut FlashLoanOrchestrator,
        request: &ExecutionRequest,
        composition: Composition,
    ) -> EngineResult<Settled> {
        let mode = request.path.mode()?;
        let mut settlement = Settlement::new(self.engine);

        let (amount, hops, flashloan) = match (composition.funding_leg(), composition.output_leg()) {
            (Some(funding), Some(output)) => {
                let (outcome, receipt) = self.run_leveraged(
                    state,
                    &mut settlement,
                    orchestrator,
                    request,
                    composition,
                    mode,
                    funding,
                    output,
                )?;
                let settled = match request.direction {
                    Direction::ExactIn => outcome.swapped,
                    Direction::ExactOut => outcome.funded,
                };
                (settled, outcome.hops, Some(receipt))
            }
            _ => {
                if mode.is_max() {
                    return Err(EngineError::AmountModeUnsupported {
                        composition,
                        direction: request.direction,
                    });
                }
                if request.amount.is_zero() {
                    return Err(EngineError::ZeroAmount);
                }
                let (hops, cursor) = self.run_hops(
                    state,
                    &mut settlement,
                    &request.path,
                    request.direction,
                    request.amount,
                )?;
                (cursor, hops, None)
            }
        };

        check_slippage(request.direction, amount, request.limit)?;
        let report = settlement.settle(state, request.caller)?;

        info!(
            target: "engine",
            caller = %request.caller,
            composition = composition.as_str(),
            direction = request.direction.as_str(),
            hops = hops.len(),
            settled = %amount,
            "execution settled"
        );
        events::execution_settled(composition.as_str(), request.direction.as_str(), hops.len());

        Ok(Settled {
            amount,
            composition,
            direction: request.direction,
            hops,
            flashloan,
            report,
        })
    }

    fn run_hops(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        path: &Path,
        direction: Direction,
        amount: U256,
    ) -> EngineResult<(Vec<SwapFill>, U256)> {
        self.walk_hops(state, settlement, path, direction, amount, true)
    }

    /// 按编码顺序逐跳兑换，游标在 hop 之间传递。
    fn walk_hops(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        path: &Path,
        direction: Direction,
        amount: U256,
        observed: bool,
    ) -> EngineResult<(Vec<SwapFill>, U256)> {
        let mut cursor = amount;
        let mut fills = Vec::with_capacity(path.len());
        for leg in path.legs() {
            let (token_in, token_out) = leg.oriented(direction);
            let swap = SwapLeg {
                provider_id: leg.hop.provider_id,
                token_in,
                token_out,
                fee: leg.hop.fee,
            };
            let fill = match direction {
                Direction::ExactIn => self.venues.swap_exact_in(state, settlement, &swap, cursor)?,
                Direction::ExactOut => self.venues.swap_exact_out(state, settlement, &swap, cursor)?,
            };
            if observed {
                debug!(
                    target: "engine::hop",
                    index = leg.index,
                    provider_id = swap.provider_id,
                    pool = %fill.pool,
                    token_in = %token_in,
                    token_out = %token_out,
                    amount_in = %fill.amount_in,
                    amount_out = %fill.amount_out,
                    "swap"
                );
                events::hop_executed(swap.provider_id, direction.as_str());
            }
            cursor = match direction {
                Direction::ExactIn => fill.amount_out,
                Direction::ExactOut => fill.amount_in,
            };
            fills.push(fill);
        }
        Ok((fills, cursor))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_leveraged(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        orchestrator: &mut FlashLoanOrchestrator,
        request: &ExecutionRequest,
        composition: Composition,
        mode: ModeFlag,
        funding: FundingLeg,
        output: OutputLeg,
    ) -> EngineResult<(LeveragedOutcome, FlashReceipt)> {
        let lender = Arc::clone(self.lenders.lender(mode.lender_id)?);
        let user = request.caller;
        let direction = request.direction;
        let (asset, out_token) = request.path.endpoints(direction);
        let rate = self.flash.fee_rate();
        let fee_mode = self.flash.fee_mode();
        let unsupported = || EngineError::AmountModeUnsupported {
            composition,
            direction,
        };

        let (terms, target) = match direction {
            Direction::ExactIn => {
                let budget = if mode.is_max() {
                    match funding {
                        FundingLeg::Withdraw => lender.collateral_of(state, user, asset),
                        FundingLeg::Borrow => return Err(unsupported()),
                    }
                } else {
                    request.amount
                };
                if budget.is_zero() {
                    return Err(EngineError::ZeroAmount);
                }
                (rate.size_for_budget(budget, fee_mode)?, U256::ZERO)
            }
            Direction::ExactOut => {
                let target = self
                    .output_target(state, request, lender.as_ref(), mode, output, out_token)
                    .ok_or_else(unsupported)?;
                if target.is_zero() {
                    return Err(EngineError::ZeroAmount);
                }
                let (_, required) = self.quote(state, &request.path, direction, target)?;
                (rate.size_for_input(required, fee_mode)?, target)
            }
        };
        if terms.gross.is_zero() {
            return Err(EngineError::ZeroAmount);
        }

        let mut outcome = LeveragedOutcome::default();
        let plan = FlashPlan {
            user,
            asset,
            gross: terms.gross,
            path: request.path.clone(),
            direction,
        };
        let receipt = orchestrator.initiate(state, settlement, self.flash, plan, |world, settlement, context| {
            let cursor = match context.direction {
                Direction::ExactIn => context.terms.delivered,
                Direction::ExactOut => target,
            };
            let (hops, end) = self.run_hops(world, settlement, &context.path, context.direction, cursor)?;
            let produced = match context.direction {
                Direction::ExactIn => end,
                Direction::ExactOut => target,
            };
            self.apply_output(world, settlement, lender.as_ref(), output, context.user, out_token, produced)?;

            let held = settlement.held(context.asset);
            let funded = context.terms.owed.saturating_sub(held);
            if !funded.is_zero() {
                self.apply_funding(world, settlement, lender.as_ref(), funding, context.user, context.asset, funded)?;
            }
            outcome = LeveragedOutcome {
                hops,
                swapped: end,
                funded,
            };
            Ok::<(), EngineError>(())
        })?;

        Ok((outcome, receipt))
    }

    /// exact-out 下输出侧的目标数量；不支持 max 时返回 `None`。
    fn output_target(
        &self,
        state: &WorldState,
        request: &ExecutionRequest,
        lender: &dyn LendingMarket,
        mode: ModeFlag,
        output: OutputLeg,
        out_token: Address,
    ) -> Option<U256> {
        if !mode.is_max() {
            return Some(request.amount);
        }
        match output {
            OutputLeg::Repay => Some(lender.debt_of(state, request.caller, out_token)),
            OutputLeg::Supply => None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_output(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        lender: &dyn LendingMarket,
        leg: OutputLeg,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> EngineResult<()> {
        match leg {
            OutputLeg::Supply => {
                lender.supply(state, settlement, user, asset, amount)?;
                debug!(target: "engine::hop", lender = lender.id(), %user, %asset, %amount, "supply");
            }
            OutputLeg::Repay => {
                let repaid = lender.repay(state, settlement, user, asset, amount)?;
                debug!(
                    target: "engine::hop",
                    lender = lender.id(),
                    %user,
                    %asset,
                    %amount,
                    %repaid,
                    "repay"
                );
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_funding(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        lender: &dyn LendingMarket,
        leg: FundingLeg,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> EngineResult<()> {
        match leg {
            FundingLeg::Borrow => lender.borrow(state, settlement, user, asset, amount)?,
            FundingLeg::Withdraw => lender.withdraw(state, settlement, user, asset, amount)?,
        }
        debug!(
            target: "engine::hop",
            lender = lender.id(),
            %user,
            %asset,
            %amount,
            leg = match leg {
                FundingLeg::Borrow => "borrow",
                FundingLeg::Withdraw => "withdraw",
            },
            "funding"
        );
        Ok(())
    }
}

fn check_slippage(direction: Direction, settled: U256, limit: U256) -> EngineResult<()> {
    let violated = match direction {
        Direction::ExactIn => settled < limit,
        Direction::ExactOut => settled > limit,
    };
    if violated {
        return Err(EngineError::SlippageExceeded {
            direction,
            settled,
            limit,
        });
    }
    Ok(())
}
