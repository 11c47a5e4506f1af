use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};

use super::error::{StateError, StateResult};
use super::WorldState;

/// 引擎账户在单次执行中对某个代币的净头寸。`held` 与 `owed` 至多一个非零。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenDelta {
    pub held: U256,
    pub owed: U256,
}

/// 执行结束时与调用方结算的明细。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettlementReport {
    pub paid_out: Vec<(Address, U256)>,
    pub pulled_in: Vec<(Address, U256)>,
}

/// 单次执行内引擎账户的瞬时头寸。
///
/// venue / lender 先记账，执行结束后一次性与调用方结算：
/// 持有的部分转给调用方，欠下的部分从调用方余额扣除。
#[derive(Debug, Clone)]
pub struct Settlement {
    account: Address,
    deltas: BTreeMap<Address, TokenDelta>,
}

impl Settlement {
    pub fn new(account: Address) -> Self {
        Self {
            account,
            deltas: BTreeMap::new(),
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn delta(&self, token: Address) -> TokenDelta {
        self.deltas.get(&token).copied().unwrap_or_default()
    }

    pub fn held(&self, token: Address) -> U256 {
        self.delta(token).held
    }

    pub fn owed(&self, token: Address) -> U256 {
        self.delta(token).owed
    }

    /// 引擎收到 `amount`。
    pub fn credit(&mut self, token: Address, amount: U256) -> StateResult<()> {
        let entry = self.deltas.entry(token).or_default();
        if entry.owed >= amount {
            entry.owed -= amount;
        } else {
            let surplus = amount - entry.owed;
            entry.owed = U256::ZERO;
            entry.held = entry
                .held
                .checked_add(surplus)
                .ok_or(StateError::Overflow {
                    token,
                    holder: self.account,
                })?;
        }
        self.prune(token);
        Ok(())
    }

    /// 引擎付出 `amount`；持有不足的部分记为欠款。
    pub fn debit(&mut self, token: Address, amount: U256) -> StateResult<()> {
        let entry = self.deltas.entry(token).or_default();
        if entry.held >= amount {
            entry.held -= amount;
        } else {
            let shortfall = amount - entry.held;
            entry.held = U256::ZERO;
            entry.owed = entry
                .owed
                .checked_add(shortfall)
                .ok_or(StateError::Overflow {
                    token,
                    holder: self.account,
                })?;
        }
        self.prune(token);
        Ok(())
    }

    /// 只允许动用已持有的部分，不产生欠款。
    pub fn spend_held(&mut self, token: Address, amount: U256) -> StateResult<()> {
        let held = self.held(token);
        if held < amount {
            return Err(StateError::InsufficientHeld {
                token,
                held,
                required: amount,
            });
        }
        self.debit(token, amount)
    }

    pub fn is_flat(&self) -> bool {
        self.deltas.is_empty()
    }

    /// 与调用方结算：先收欠款，再付持有。任一步失败整个事务回滚。
    pub fn settle(self, state: &mut WorldState, counterparty: Address) -> StateResult<SettlementReport> {
        let mut report = SettlementReport::default();
        for (token, delta) in &self.deltas {
            if !delta.owed.is_zero() {
                state.debit(*token, counterparty, delta.owed)?;
                report.pulled_in.push((*token, delta.owed));
            }
        }
        for (token, delta) in &self.deltas {
            if !delta.held.is_zero() {
                state.credit(*token, counterparty, delta.held)?;
                report.paid_out.push((*token, delta.held));
            }
        }
        Ok(report)
    }

    fn prune(&mut self, token: Address) {
        if self
            .deltas
            .get(&token)
            .is_some_and(|delta| delta.held.is_zero() && delta.owed.is_zero())
        {
            self.deltas.remove(&token);
        }
    }
}
