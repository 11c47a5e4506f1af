//! 进程内世界状态：代币余额与借贷仓位，外加"全有或全无"的缓冲事务。

mod error;
mod settlement;

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

pub use error::{StateError, StateResult};
pub use settlement::{Settlement, SettlementReport, TokenDelta};

/// 借贷市场内单个 (user, asset) 的仓位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub collateral: U256,
    pub debt: U256,
}

impl Position {
    pub fn is_empty(&self) -> bool {
        self.collateral.is_zero() && self.debt.is_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionKey {
    pub market: Address,
    pub user: Address,
    pub asset: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldState {
    balances: BTreeMap<(Address, Address), U256>,
    positions: BTreeMap<PositionKey, Position>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances
            .get(&(token, holder))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn credit(&mut self, token: Address, holder: Address, amount: U256) -> StateResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let entry = self.balances.entry((token, holder)).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(StateError::Overflow { token, holder })?;
        Ok(())
    }

    pub fn debit(&mut self, token: Address, holder: Address, amount: U256) -> StateResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.balance_of(token, holder);
        if available < amount {
            return Err(StateError::InsufficientBalance {
                token,
                holder,
                available,
                required: amount,
            });
        }
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(&(token, holder));
        } else {
            self.balances.insert((token, holder), remaining);
        }
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> StateResult<()> {
        self.debit(token, from, amount)?;
        self.credit(token, to, amount)
    }

    /// 总量：所有持有者余额之和。用于守恒校验。
    pub fn total_supply(&self, token: Address) -> U256 {
        self.balances
            .iter()
            .filter(|((t, _), _)| *t == token)
            .fold(U256::ZERO, |acc, (_, amount)| acc.saturating_add(*amount))
    }

    pub fn balances(&self) -> impl Iterator<Item = (Address, Address, U256)> + '_ {
        self.balances
            .iter()
            .map(|((token, holder), amount)| (*token, *holder, *amount))
    }

    pub fn position(&self, market: Address, user: Address, asset: Address) -> Position {
        self.positions
            .get(&PositionKey {
                market,
                user,
                asset,
            })
            .copied()
            .unwrap_or_default()
    }

    pub fn set_position(
        &mut self,
        market: Address,
        user: Address,
        asset: Address,
        position: Position,
    ) {
        let key = PositionKey {
            market,
            user,
            asset,
        };
        if position.is_empty() {
            self.positions.remove(&key);
        } else {
            self.positions.insert(key, position);
        }
    }

    /// 某用户在某市场的全部仓位。
    pub fn positions_of(
        &self,
        market: Address,
        user: Address,
    ) -> impl Iterator<Item = (Address, Position)> + '_ {
        self.positions
            .iter()
            .filter(move |(key, _)| key.market == market && key.user == user)
            .map(|(key, position)| (key.asset, *position))
    }
}

/// 已提交的世界状态。每次调用在副本上执行，只有成功才整体替换。
#[derive(Debug, Default)]
pub struct Ledger {
    state: WorldState,
    committed: u64,
}

impl Ledger {
    pub fn new(state: WorldState) -> Self {
        Self {
            state,
            committed: 0,
        }
    }

    pub fn state(&self) -> &WorldState {
        &self.state
    }

    pub fn committed(&self) -> u64 {
        self.committed
    }

    pub fn transact<T, E>(
        &mut self,
        body: impl FnOnce(&mut WorldState) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut working = self.state.clone();
        match body(&mut working) {
            Ok(value) => {
                self.state = working;
                self.committed += 1;
                Ok(value)
            }
            Err(err) => {
                debug!(target: "state", committed = self.committed, "transaction discarded");
                Err(err)
            }
        }
    }
}
