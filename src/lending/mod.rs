//! 借贷市场适配层：supply / withdraw / borrow / repay 四个原语与仓位查询。

mod error;
pub mod pooled;

use std::collections::BTreeMap;
use std::sync::Arc;

use alloy_primitives::{Address, U256};

use crate::state::{Settlement, WorldState};

pub use error::{LendingError, LendingResult};
pub use pooled::{AssetConfig, PooledLendingMarket};

/// 借贷市场的统一调用契约。
///
/// 资金流经引擎的 `Settlement`：supply / repay 消耗引擎头寸，withdraw / borrow 增加引擎头寸；
/// 仓位始终记在 `user`（原始调用方）名下。
pub trait LendingMarket: Send + Sync {
    fn id(&self) -> u8;

    fn address(&self) -> Address;

    fn supply(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()>;

    fn withdraw(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()>;

    fn borrow(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<()>;

    /// 按未偿债务封顶，返回实际偿还的数量。
    fn repay(
        &self,
        state: &mut WorldState,
        settlement: &mut Settlement,
        user: Address,
        asset: Address,
        amount: U256,
    ) -> LendingResult<U256>;

    fn collateral_of(&self, state: &WorldState, user: Address, asset: Address) -> U256;

    fn debt_of(&self, state: &WorldState, user: Address, asset: Address) -> U256;
}

/// lender id -> 借贷市场。
#[derive(Default, Clone)]
pub struct LenderBook {
    lenders: BTreeMap<u8, Arc<dyn LendingMarket>>,
}

impl std::fmt::Debug for LenderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lenders: Vec<(u8, Address)> = self
            .lenders
            .iter()
            .map(|(id, market)| (*id, market.address()))
            .collect();
        f.debug_struct("LenderBook").field("lenders", &lenders).finish()
    }
}

impl LenderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, market: Arc<dyn LendingMarket>) -> LendingResult<()> {
        let id = market.id();
        if self.lenders.contains_key(&id) {
            return Err(LendingError::DuplicateLender(id));
        }
        self.lenders.insert(id, market);
        Ok(())
    }

    pub fn lender(&self, id: u8) -> LendingResult<&Arc<dyn LendingMarket>> {
        self.lenders.get(&id).ok_or(LendingError::UnknownLender(id))
    }

    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.lenders.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lenders.is_empty()
    }
}
