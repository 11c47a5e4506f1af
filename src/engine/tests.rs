use std::sync::Arc;

use alloy_primitives::{Address, U256};

use crate::flashloan::{FeeMode, FeeRate, FlashLoanOrchestrator, FlashState, ReserveFlashLender};
use crate::lending::{AssetConfig, LenderBook, LendingMarket, PooledLendingMarket};
use crate::path::{ActionCode, AmountMode, Direction, ModeFlag, Path, PathBuilder};
use crate::state::{Ledger, Position, WorldState};
use crate::venues::{
    ConstantProductVenue, FixedRatePool, FixedRateVenue, Reserves, SwapLeg, SwapVenue, VenueBook,
};

use super::*;

const TOKEN_A: u8 = 0x0a;
const TOKEN_B: u8 = 0x0b;
const TOKEN_C: u8 = 0x0c;
const POOL_AB: u8 = 0x51;
const POOL_BC: u8 = 0x52;
const POOL_PEG: u8 = 0x53;
const MARKET: u8 = 0x70;
const CALLER: u8 = 0xca;
const ENGINE: u8 = 0xe0;
const LENDER: u8 = 0xf1;

const DEEP: u64 = 1_000_000_000;

fn addr(tag: u8) -> Address {
    Address::repeat_byte(tag)
}

fn u(value: u64) -> U256 {
    U256::from(value)
}

struct Fixture {
    venues: VenueBook,
    lenders: LenderBook,
    flash: ReserveFlashLender,
    orchestrator: FlashLoanOrchestrator,
    state: WorldState,
}

fn fixture(fee_mode: FeeMode, fee_bps: u64) -> Fixture {
    let mut venues = VenueBook::new();
    venues
        .register(
            1,
            Arc::new(
                ConstantProductVenue::new()
                    .with_pool(addr(TOKEN_A), addr(TOKEN_B), 3000, addr(POOL_AB))
                    .with_pool(addr(TOKEN_B), addr(TOKEN_C), 3000, addr(POOL_BC)),
            ),
        )
        .unwrap();
    let mut pegged = FixedRateVenue::new();
    pegged
        .insert_pool(
            addr(TOKEN_A),
            addr(TOKEN_B),
            0,
            FixedRatePool {
                address: addr(POOL_PEG),
                rate_numerator: 1,
                rate_denominator: 1,
            },
        )
        .unwrap();
    venues.register(2, Arc::new(pegged)).unwrap();

    let mut market = PooledLendingMarket::new(0, addr(MARKET));
    for token in [TOKEN_A, TOKEN_B, TOKEN_C] {
        market
            .list_asset(
                addr(token),
                AssetConfig {
                    price: u(1),
                    ltv_bps: 8_000,
                },
            )
            .unwrap();
    }
    let mut lenders = LenderBook::new();
    lenders.register(Arc::new(market)).unwrap();

    let mut state = WorldState::new();
    for (token, holder) in [
        (TOKEN_A, POOL_AB),
        (TOKEN_B, POOL_AB),
        (TOKEN_B, POOL_BC),
        (TOKEN_C, POOL_BC),
        (TOKEN_A, POOL_PEG),
        (TOKEN_B, POOL_PEG),
        (TOKEN_A, MARKET),
        (TOKEN_B, MARKET),
        (TOKEN_C, MARKET),
        (TOKEN_A, LENDER),
        (TOKEN_B, LENDER),
        (TOKEN_C, LENDER),
    ] {
        state.credit(addr(token), addr(holder), u(DEEP)).unwrap();
    }
    state.credit(addr(TOKEN_A), addr(CALLER), u(10_000_000)).unwrap();

    Fixture {
        venues,
        lenders,
        flash: ReserveFlashLender::new(addr(LENDER), FeeRate::from_bps(fee_bps).unwrap(), fee_mode),
        orchestrator: FlashLoanOrchestrator::new(addr(ENGINE)),
        state,
    }
}

fn seed_position(state: &mut WorldState, asset: u8, collateral: u64, debt: u64) {
    state.set_position(
        addr(MARKET),
        addr(CALLER),
        addr(asset),
        Position {
            collateral: u(collateral),
            debt: u(debt),
        },
    );
}

fn request(path: Path, amount: U256, limit: U256, direction: Direction) -> ExecutionRequest {
    ExecutionRequest {
        caller: addr(CALLER),
        path,
        amount,
        limit,
        direction,
    }
}

fn spot_abc() -> Path {
    PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::SwapExactIn, addr(TOKEN_B))
        .hop(3000, 1, ActionCode::SwapExactIn, addr(TOKEN_C))
        .build()
        .unwrap()
}

fn cp_out(amount_in: U256) -> U256 {
    let leg = SwapLeg {
        provider_id: 1,
        token_in: addr(TOKEN_A),
        token_out: addr(TOKEN_B),
        fee: 3000,
    };
    let reserves = Reserves {
        reserve_in: u(DEEP),
        reserve_out: u(DEEP),
    };
    ConstantProductVenue::new()
        .amount_out(addr(POOL_AB), reserves, &leg, amount_in)
        .unwrap()
}

#[test]
fn two_hop_exact_in_settles_second_hop_output() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let req = request(spot_abc(), u(1_000_000), U256::ZERO, Direction::ExactIn);

    let settled = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap();

    let first = cp_out(u(1_000_000));
    let second = cp_out(first);
    assert_eq!(settled.composition, Composition::Spot);
    assert_eq!(settled.hops.len(), 2);
    assert_eq!(settled.hops[0].pool, addr(POOL_AB));
    assert_eq!(settled.hops[0].amount_out, first);
    assert_eq!(settled.hops[1].pool, addr(POOL_BC));
    assert_eq!(settled.hops[1].amount_in, first);
    assert_eq!(settled.amount, second);
    assert!(settled.flashloan.is_none());

    assert_eq!(fx.state.balance_of(addr(TOKEN_C), addr(CALLER)), second);
    assert_eq!(fx.state.balance_of(addr(TOKEN_A), addr(CALLER)), u(9_000_000));
    // 中间代币不留在引擎或调用方
    assert_eq!(fx.state.balance_of(addr(TOKEN_B), addr(CALLER)), U256::ZERO);
    assert_eq!(fx.state.balance_of(addr(TOKEN_B), addr(ENGINE)), U256::ZERO);
    assert_eq!(fx.state.total_supply(addr(TOKEN_A)), u(4 * DEEP + 10_000_000));
}

#[test]
fn exact_out_walks_reversed_path() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = spot_abc().reversed();
    let req = request(path, u(500_000), U256::MAX, Direction::ExactOut);

    let settled = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap();

    assert_eq!(settled.hops[0].amount_out, u(500_000));
    assert_eq!(settled.hops[1].amount_out, settled.hops[0].amount_in);
    assert_eq!(settled.amount, settled.hops[1].amount_in);
    assert_eq!(fx.state.balance_of(addr(TOKEN_C), addr(CALLER)), u(500_000));
    assert_eq!(
        fx.state.balance_of(addr(TOKEN_A), addr(CALLER)),
        u(10_000_000) - settled.amount
    );
}

#[test]
fn exact_in_slippage_discards_everything() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let expected = cp_out(cp_out(u(1_000_000)));
    let req = request(spot_abc(), u(1_000_000), expected + U256::from(1), Direction::ExactIn);

    let mut ledger = Ledger::new(fx.state.clone());
    let err = ledger
        .transact(|state| interpreter.execute(state, &mut fx.orchestrator, &req))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::SlippageExceeded {
            direction: Direction::ExactIn,
            settled: expected,
            limit: expected + U256::from(1),
        }
    );
    assert_eq!(err.category(), FailureCategory::SlippageViolation);
    assert_eq!(ledger.state(), &fx.state);

    let req = request(spot_abc(), u(1_000_000), expected, Direction::ExactIn);
    let settled = ledger
        .transact(|state| interpreter.execute(state, &mut fx.orchestrator, &req))
        .unwrap();
    assert_eq!(settled.amount, expected);
}

#[test]
fn exact_out_slippage_caps_input() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let req = request(spot_abc().reversed(), u(500_000), u(500_000), Direction::ExactOut);
    let err = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap_err();
    assert!(matches!(
        err,
        EngineError::SlippageExceeded {
            direction: Direction::ExactOut,
            ..
        }
    ));
}

#[test]
fn failing_hop_leaves_state_untouched() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    // 第二跳的 fee 档位没有池子
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::SwapExactIn, addr(TOKEN_B))
        .hop(500, 1, ActionCode::SwapExactIn, addr(TOKEN_C))
        .build()
        .unwrap();
    let req = request(path, u(1_000_000), U256::ZERO, Direction::ExactIn);

    let mut ledger = Ledger::new(fx.state.clone());
    let err = ledger
        .transact(|state| interpreter.execute(state, &mut fx.orchestrator, &req))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Venue(crate::venues::VenueError::PoolNotFound { fee: 500, .. })
    ));
    assert_eq!(err.category(), FailureCategory::Liquidity);
    assert_eq!(ledger.state(), &fx.state);
    assert_eq!(ledger.committed(), 0);
}

#[test]
fn unknown_provider_is_malformed() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 9, ActionCode::SwapExactIn, addr(TOKEN_B))
        .build()
        .unwrap();
    let err = interpreter
        .execute(&mut fx.state, &mut fx.orchestrator, &request(path, u(10), U256::ZERO, Direction::ExactIn))
        .unwrap_err();
    assert_eq!(err.category(), FailureCategory::MalformedInput);
}

#[test]
fn entry_point_rejects_other_compositions() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let req = request(spot_abc(), u(1_000), U256::ZERO, Direction::ExactIn);
    let err = interpreter
        .execute_as(&mut fx.state, &mut fx.orchestrator, &req, Composition::MarginOpen)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ActionMismatch {
            expected: Composition::MarginOpen,
            found: Composition::Spot,
        }
    );
}

#[test]
fn margin_open_exact_in_borrows_within_budget() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_B, 1_000_000, 0);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::MarginOpen, addr(TOKEN_B))
        .build()
        .unwrap();
    let req = request(path, u(1_000_000), U256::ZERO, Direction::ExactIn);

    let settled = interpreter
        .execute_as(&mut fx.state, &mut fx.orchestrator, &req, Composition::MarginOpen)
        .unwrap();

    let receipt = settled.flashloan.unwrap();
    assert_eq!(receipt.terms.gross, u(999_101));
    assert_eq!(receipt.terms.fee, u(899));
    assert_eq!(receipt.terms.owed, u(1_000_000));
    assert_eq!(settled.amount, cp_out(u(999_101)));

    let market = fx.lenders.lender(0).unwrap();
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)), u(1_000_000));
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_B)),
        u(1_000_000) + settled.amount
    );
    assert_eq!(fx.state.balance_of(addr(TOKEN_A), addr(LENDER)), u(DEEP + 899));
    // 调用方钱包不参与杠杆操作
    assert_eq!(fx.state.balance_of(addr(TOKEN_A), addr(CALLER)), u(10_000_000));
    assert!(settled.report.paid_out.is_empty());
    assert!(settled.report.pulled_in.is_empty());
}

#[test]
fn margin_open_exact_out_seven_hundred_at_nine_bps() {
    let mut fx = fixture(FeeMode::Deducted, 9);
    seed_position(&mut fx.state, TOKEN_B, 1_000_000, 0);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    // exact-out：路径以输出代币开头，1:1 挂钩池，零 swap 费
    let path = PathBuilder::new(addr(TOKEN_B))
        .hop(0, 2, ActionCode::MarginOpen, addr(TOKEN_A))
        .build()
        .unwrap();
    let req = request(path, u(700), U256::MAX, Direction::ExactOut);

    let settled = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap();

    let receipt = settled.flashloan.unwrap();
    let rate = FeeRate::from_bps(9).unwrap();
    assert_eq!(receipt.terms.gross, rate.gross_for_net(u(700)).unwrap());
    assert_eq!(receipt.terms.gross, u(700));
    assert_eq!(
        receipt.terms.owed,
        receipt.terms.gross + rate.fee_on(receipt.terms.gross).unwrap()
    );
    assert_eq!(settled.amount, u(700));

    let market = fx.lenders.lender(0).unwrap();
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)), u(700));
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_B)),
        u(1_000_700)
    );
}

#[test]
fn margin_open_exact_out_surcharge_repays_gross_plus_fee() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_B, 1_000_000, 0);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_B))
        .hop(0, 2, ActionCode::MarginOpen, addr(TOKEN_A))
        .build()
        .unwrap();

    // 700 * 9 / 10000 向下取整为 0
    let settled = interpreter
        .execute(
            &mut fx.state,
            &mut fx.orchestrator,
            &request(path.clone(), u(700), U256::MAX, Direction::ExactOut),
        )
        .unwrap();
    let receipt = settled.flashloan.unwrap();
    assert_eq!(receipt.terms.gross, u(700));
    assert_eq!(receipt.terms.fee, U256::ZERO);
    assert_eq!(receipt.terms.owed, u(700));
    assert_eq!(settled.amount, u(700));

    let settled = interpreter
        .execute(
            &mut fx.state,
            &mut fx.orchestrator,
            &request(path, u(1_000_000), U256::MAX, Direction::ExactOut),
        )
        .unwrap();
    let receipt = settled.flashloan.unwrap();
    let gross = u(1_000_000);
    assert_eq!(receipt.terms.gross, gross);
    assert_eq!(receipt.terms.fee, u(900));
    assert_eq!(receipt.terms.delivered, gross);
    assert_eq!(receipt.terms.owed, gross + gross * u(9) / u(10_000));
    assert_eq!(settled.amount, u(1_000_900));

    let market = fx.lenders.lender(0).unwrap();
    assert_eq!(
        market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)),
        u(700 + 1_000_900)
    );
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_B)),
        u(1_000_000 + 700 + 1_000_000)
    );
    assert_eq!(fx.state.balance_of(addr(TOKEN_A), addr(LENDER)), u(DEEP + 900));
}

#[test]
fn two_hop_margin_open_runs_in_both_directions() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_C, 1_000_000, 0);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::MarginOpen, addr(TOKEN_B))
        .hop(3000, 1, ActionCode::SwapExactIn, addr(TOKEN_C))
        .build()
        .unwrap();
    let market = Arc::clone(fx.lenders.lender(0).unwrap());

    let forward = interpreter
        .execute(
            &mut fx.state,
            &mut fx.orchestrator,
            &request(path.clone(), u(100_000), U256::ZERO, Direction::ExactIn),
        )
        .unwrap();
    let receipt = forward.flashloan.unwrap();
    assert_eq!(forward.composition, Composition::MarginOpen);
    assert_eq!(forward.hops.len(), 2);
    assert_eq!(receipt.asset, addr(TOKEN_A));
    assert_eq!(receipt.nonce, 1);
    assert_eq!(forward.amount, cp_out(cp_out(receipt.terms.delivered)));
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)), receipt.terms.owed);
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_C)),
        u(1_000_000) + forward.amount
    );
    let debt_after_forward = receipt.terms.owed;

    // 反向路径以 C 开头，杠杆码留在第一跳
    let reversed = path.reversed();
    assert_eq!(reversed.hops()[0].action, u8::from(ActionCode::MarginOpen));
    let backward = interpreter
        .execute(
            &mut fx.state,
            &mut fx.orchestrator,
            &request(reversed, u(50_000), U256::MAX, Direction::ExactOut),
        )
        .unwrap();
    let receipt = backward.flashloan.unwrap();
    assert_eq!(backward.composition, Composition::MarginOpen);
    assert_eq!(backward.hops.len(), 2);
    assert_eq!(receipt.asset, addr(TOKEN_A));
    assert_eq!(receipt.nonce, 2);
    assert_eq!(backward.amount, receipt.terms.owed);
    assert_eq!(
        market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)),
        debt_after_forward + backward.amount
    );
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_C)),
        u(1_000_000) + forward.amount + u(50_000)
    );
    assert_eq!(fx.orchestrator.state(), &FlashState::Idle);
}

#[test]
fn margin_close_exact_out_repays_full_debt() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_B, 2_000_000, 0);
    seed_position(&mut fx.state, TOKEN_A, 0, 500_000);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::MarginClose, addr(TOKEN_B))
        .mode(ModeFlag::new(AmountMode::Max, 0).unwrap())
        .build()
        .unwrap();
    // max 模式下数量取自仓位，请求里的数量被忽略
    let req = request(path, U256::ZERO, U256::MAX, Direction::ExactOut);

    let settled = interpreter
        .execute_as(&mut fx.state, &mut fx.orchestrator, &req, Composition::MarginClose)
        .unwrap();

    let market = fx.lenders.lender(0).unwrap();
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)), U256::ZERO);
    let receipt = settled.flashloan.unwrap();
    assert_eq!(settled.amount, receipt.terms.owed);
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_B)),
        u(2_000_000) - settled.amount
    );
}

#[test]
fn collateral_swap_exact_in_moves_collateral() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_A, 1_000_000, 0);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::CollateralSwap, addr(TOKEN_B))
        .build()
        .unwrap();
    let req = request(path, u(500_000), U256::ZERO, Direction::ExactIn);

    let settled = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap();

    let market = fx.lenders.lender(0).unwrap();
    let receipt = settled.flashloan.unwrap();
    assert!(receipt.terms.owed <= u(500_000));
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_A)),
        u(1_000_000) - receipt.terms.owed
    );
    assert_eq!(
        market.collateral_of(&fx.state, addr(CALLER), addr(TOKEN_B)),
        settled.amount
    );
}

#[test]
fn debt_swap_pays_repay_surplus_to_caller() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    seed_position(&mut fx.state, TOKEN_C, 10_000_000, 0);
    seed_position(&mut fx.state, TOKEN_B, 0, 100);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::DebtSwap, addr(TOKEN_B))
        .build()
        .unwrap();
    let req = request(path, u(1_000_000), U256::ZERO, Direction::ExactIn);

    let settled = interpreter.execute(&mut fx.state, &mut fx.orchestrator, &req).unwrap();

    let market = fx.lenders.lender(0).unwrap();
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_B)), U256::ZERO);
    assert_eq!(market.debt_of(&fx.state, addr(CALLER), addr(TOKEN_A)), u(1_000_000));
    assert_eq!(
        fx.state.balance_of(addr(TOKEN_B), addr(CALLER)),
        settled.amount - u(100)
    );
    assert_eq!(settled.report.paid_out, vec![(addr(TOKEN_B), settled.amount - u(100))]);
}

#[test]
fn max_borrow_is_not_a_thing() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::DebtSwap, addr(TOKEN_B))
        .mode(ModeFlag::new(AmountMode::Max, 0).unwrap())
        .build()
        .unwrap();
    let err = interpreter
        .execute(&mut fx.state, &mut fx.orchestrator, &request(path, u(1), U256::ZERO, Direction::ExactIn))
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::AmountModeUnsupported {
            composition: Composition::DebtSwap,
            direction: Direction::ExactIn,
        }
    );
}

#[test]
fn unhealthy_margin_open_rolls_back() {
    let mut fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let path = PathBuilder::new(addr(TOKEN_A))
        .hop(3000, 1, ActionCode::MarginOpen, addr(TOKEN_B))
        .build()
        .unwrap();
    // 没有任何已有抵押，80% ltv 撑不起这笔借款
    let req = request(path, u(1_000_000), U256::ZERO, Direction::ExactIn);
    let mut ledger = Ledger::new(fx.state.clone());
    let err = ledger
        .transact(|state| interpreter.execute(state, &mut fx.orchestrator, &req))
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Lending(crate::lending::LendingError::Unhealthy { .. })
    ));
    assert_eq!(ledger.state(), &fx.state);
}

#[test]
fn quoting_is_pure() {
    let fx = fixture(FeeMode::Surcharge, 9);
    let interpreter = Interpreter::new(addr(ENGINE), &fx.venues, &fx.lenders, &fx.flash);
    let before = fx.state.clone();
    let (fills, out) = interpreter
        .quote(&fx.state, &spot_abc(), Direction::ExactIn, u(1_000_000))
        .unwrap();
    assert_eq!(fills.len(), 2);
    assert_eq!(out, cp_out(cp_out(u(1_000_000))));
    assert_eq!(fx.state, before);
}

#[test]
fn flash_loan_failures_are_categorised() {
    use crate::flashloan::FlashloanError;

    let category = |err: FlashloanError| EngineError::Flashloan(err).category();
    assert_eq!(category(FlashloanError::ContinuationFailed), FailureCategory::Liquidity);
    assert_eq!(category(FlashloanError::Reentrancy), FailureCategory::Authorization);
    assert_eq!(category(FlashloanError::CallbackMissing), FailureCategory::Authorization);
}
