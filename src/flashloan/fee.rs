use alloy_primitives::U256;
use serde::Deserialize;
use thiserror::Error;

pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("费率非法: fee={fee} denom={denom}")]
    InvalidRate { fee: u64, denom: u64 },
    #[error("费用计算溢出")]
    Overflow,
}

pub type FeeResult<T> = Result<T, FeeError>;

/// 闪电贷费用的收取方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeeMode {
    /// 交付 gross，归还 gross + fee(gross)
    #[default]
    Surcharge,
    /// 交付 gross - fee(gross)，归还 gross
    Deducted,
}

impl FeeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeMode::Surcharge => "surcharge",
            FeeMode::Deducted => "deducted",
        }
    }
}

/// `fee / denom` 形式的费率，与 provider 实际收费公式一致：`floor(x * fee / denom)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate {
    fee: u64,
    denom: u64,
}

/// 一笔闪电贷的完整条款。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTerms {
    pub gross: U256,
    pub fee: U256,
    pub delivered: U256,
    pub owed: U256,
}

impl FeeRate {
    pub const ZERO: FeeRate = FeeRate { fee: 0, denom: 1 };

    pub fn new(fee: u64, denom: u64) -> FeeResult<Self> {
        if denom == 0 || fee >= denom {
            return Err(FeeError::InvalidRate { fee, denom });
        }
        Ok(Self { fee, denom })
    }

    pub fn from_bps(bps: u64) -> FeeResult<Self> {
        Self::new(bps, BPS_DENOMINATOR)
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn denom(&self) -> u64 {
        self.denom
    }

    pub fn fee_on(&self, amount: U256) -> FeeResult<U256> {
        let scaled = amount
            .checked_mul(U256::from(self.fee))
            .ok_or(FeeError::Overflow)?;
        Ok(scaled / U256::from(self.denom))
    }

    /// 满足 `G - fee_on(G) >= net` 的最小 G。
    ///
    /// 先用 `net * denom / (denom - fee)` 估算，再用真实收费公式校正；
    /// 截断误差只允许向"足够"的一侧取整。
    pub fn gross_for_net(&self, net: U256) -> FeeResult<U256> {
        if net.is_zero() {
            return Ok(U256::ZERO);
        }
        let denom = U256::from(self.denom);
        let mut gross = net
            .checked_mul(denom)
            .ok_or(FeeError::Overflow)?
            / U256::from(self.denom - self.fee);

        while self.net_of(gross)? < net {
            gross = gross.checked_add(U256::from(1)).ok_or(FeeError::Overflow)?;
        }
        while gross > U256::ZERO && self.net_of(gross - U256::from(1))? >= net {
            gross -= U256::from(1);
        }
        Ok(gross)
    }

    /// 满足 `G + fee_on(G) <= budget` 的最大 G。
    pub fn principal_within(&self, budget: U256) -> FeeResult<U256> {
        let denom = U256::from(self.denom);
        let mut principal = budget
            .checked_mul(denom)
            .ok_or(FeeError::Overflow)?
            / U256::from(self.denom + self.fee);

        // 截断可能少算一个单位
        loop {
            let next = principal
                .checked_add(U256::from(1))
                .ok_or(FeeError::Overflow)?;
            if self.repayment_of(next)? <= budget {
                principal = next;
            } else {
                break;
            }
        }
        while principal > U256::ZERO && self.repayment_of(principal)? > budget {
            principal -= U256::from(1);
        }
        Ok(principal)
    }

    pub fn terms(&self, gross: U256, mode: FeeMode) -> FeeResult<FlashTerms> {
        let fee = self.fee_on(gross)?;
        let (delivered, owed) = match mode {
            FeeMode::Surcharge => (gross, gross.checked_add(fee).ok_or(FeeError::Overflow)?),
            FeeMode::Deducted => (gross - fee, gross),
        };
        Ok(FlashTerms {
            gross,
            fee,
            delivered,
            owed,
        })
    }

    /// 交付金额至少为 `input` 的最小闪电贷。
    pub fn size_for_input(&self, input: U256, mode: FeeMode) -> FeeResult<FlashTerms> {
        let gross = match mode {
            FeeMode::Surcharge => input,
            FeeMode::Deducted => self.gross_for_net(input)?,
        };
        self.terms(gross, mode)
    }

    /// 归还金额不超过 `budget` 的最大闪电贷。
    pub fn size_for_budget(&self, budget: U256, mode: FeeMode) -> FeeResult<FlashTerms> {
        let gross = match mode {
            FeeMode::Surcharge => self.principal_within(budget)?,
            FeeMode::Deducted => budget,
        };
        self.terms(gross, mode)
    }

    fn net_of(&self, gross: U256) -> FeeResult<U256> {
        Ok(gross - self.fee_on(gross)?)
    }

    fn repayment_of(&self, gross: U256) -> FeeResult<U256> {
        gross
            .checked_add(self.fee_on(gross)?)
            .ok_or(FeeError::Overflow)
    }
}
