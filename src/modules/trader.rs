use alloy_primitives::Address;
use tracing::debug;

use crate::engine::{Composition, ExecutionRequest, Interpreter};
use crate::path::Direction;
use crate::registry::calldata::{TradeArgs, encode_word};
use crate::registry::{Call, CallEnv, DispatchError, DispatchResult, Module, OperationId};

/// 交易入口：签名、组合类型与方向一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeEntry {
    pub signature: &'static str,
    pub composition: Composition,
    pub direction: Direction,
}

impl TradeEntry {
    const fn new(signature: &'static str, composition: Composition, direction: Direction) -> Self {
        Self {
            signature,
            composition,
            direction,
        }
    }

    pub fn operation(&self) -> OperationId {
        OperationId::from_signature(self.signature)
    }

    /// 函数名部分，例如 `swapExactIn`。
    pub fn name(&self) -> &'static str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(self.signature)
    }
}

pub const TRADE_ENTRIES: [TradeEntry; 10] = [
    TradeEntry::new("swapExactIn(uint256,uint256,bytes)", Composition::Spot, Direction::ExactIn),
    TradeEntry::new("swapExactOut(uint256,uint256,bytes)", Composition::Spot, Direction::ExactOut),
    TradeEntry::new(
        "openMarginPositionExactIn(uint256,uint256,bytes)",
        Composition::MarginOpen,
        Direction::ExactIn,
    ),
    TradeEntry::new(
        "openMarginPositionExactOut(uint256,uint256,bytes)",
        Composition::MarginOpen,
        Direction::ExactOut,
    ),
    TradeEntry::new(
        "closeMarginPositionExactIn(uint256,uint256,bytes)",
        Composition::MarginClose,
        Direction::ExactIn,
    ),
    TradeEntry::new(
        "closeMarginPositionExactOut(uint256,uint256,bytes)",
        Composition::MarginClose,
        Direction::ExactOut,
    ),
    TradeEntry::new(
        "swapCollateralExactIn(uint256,uint256,bytes)",
        Composition::CollateralSwap,
        Direction::ExactIn,
    ),
    TradeEntry::new(
        "swapCollateralExactOut(uint256,uint256,bytes)",
        Composition::CollateralSwap,
        Direction::ExactOut,
    ),
    TradeEntry::new("swapDebtExactIn(uint256,uint256,bytes)", Composition::DebtSwap, Direction::ExactIn),
    TradeEntry::new("swapDebtExactOut(uint256,uint256,bytes)", Composition::DebtSwap, Direction::ExactOut),
];

pub fn trade_entry(operation: OperationId) -> Option<TradeEntry> {
    TRADE_ENTRIES
        .iter()
        .copied()
        .find(|entry| entry.operation() == operation)
}

pub fn trade_entry_by_name(name: &str) -> Option<TradeEntry> {
    TRADE_ENTRIES.iter().copied().find(|entry| entry.name() == name)
}

/// 十个交易入口的实现模块。
#[derive(Debug, Clone, Copy)]
pub struct TraderModule {
    address: Address,
}

impl TraderModule {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Module for TraderModule {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        "trader"
    }

    fn operations(&self) -> Vec<OperationId> {
        TRADE_ENTRIES.iter().map(TradeEntry::operation).collect()
    }

    fn invoke(&self, env: &mut CallEnv<'_>, call: &Call<'_>) -> DispatchResult<Vec<u8>> {
        let entry = trade_entry(call.operation).ok_or(DispatchError::UnrecognizedOperation {
            selector: Some(call.operation),
        })?;
        let args = TradeArgs::decode(call.operation, call.args)?;
        debug!(
            target: "modules::trader",
            entry = entry.name(),
            caller = %call.caller,
            amount = %args.amount,
            limit = %args.limit,
            hops = args.path.len(),
            "trade entry"
        );

        let request = ExecutionRequest {
            caller: call.caller,
            path: args.path,
            amount: args.amount,
            limit: args.limit,
            direction: entry.direction,
        };
        let interpreter = Interpreter::new(env.engine, env.venues, env.lenders, env.flash);
        let settled = interpreter.execute_as(env.state, env.orchestrator, &request, entry.composition)?;
        Ok(encode_word(settled.amount).to_vec())
    }
}
