use std::fmt;

use super::error::{PathError, PathResult};

/// hop 上携带的语义操作码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionCode {
    SwapExactIn = 0,
    SwapExactOut = 1,
    MarginOpen = 2,
    MarginClose = 3,
    CollateralSwap = 4,
    DebtSwap = 5,
}

impl ActionCode {
    pub fn is_spot(self) -> bool {
        matches!(self, ActionCode::SwapExactIn | ActionCode::SwapExactOut)
    }

    /// 现货操作码在两种路径朝向之间互换；杠杆操作码保持不变。
    pub fn flipped(self) -> Self {
        match self {
            ActionCode::SwapExactIn => ActionCode::SwapExactOut,
            ActionCode::SwapExactOut => ActionCode::SwapExactIn,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::SwapExactIn => "swap-exact-in",
            ActionCode::SwapExactOut => "swap-exact-out",
            ActionCode::MarginOpen => "margin-open",
            ActionCode::MarginClose => "margin-close",
            ActionCode::CollateralSwap => "collateral-swap",
            ActionCode::DebtSwap => "debt-swap",
        }
    }
}

impl TryFrom<u8> for ActionCode {
    type Error = PathError;

    fn try_from(value: u8) -> PathResult<Self> {
        match value {
            0 => Ok(ActionCode::SwapExactIn),
            1 => Ok(ActionCode::SwapExactOut),
            2 => Ok(ActionCode::MarginOpen),
            3 => Ok(ActionCode::MarginClose),
            4 => Ok(ActionCode::CollateralSwap),
            5 => Ok(ActionCode::DebtSwap),
            other => Err(PathError::UnknownAction(other)),
        }
    }
}

impl From<ActionCode> for u8 {
    fn from(value: ActionCode) -> Self {
        value as u8
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路径的执行方向。ExactOut 要求路径以输出代币开头（反向编码）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ExactIn,
    ExactOut,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ExactIn => "exact-in",
            Direction::ExactOut => "exact-out",
        }
    }

    /// 该方向下现货 hop 应携带的操作码。
    pub fn spot_action(self) -> ActionCode {
        match self {
            Direction::ExactIn => ActionCode::SwapExactIn,
            Direction::ExactOut => ActionCode::SwapExactOut,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmountMode {
    #[default]
    Exact,
    /// withdraw-all / repay-all
    Max,
}

/// 路径末尾可选的 mode flag。
///
/// bit 0-1 为数量模式，bit 2-3 保留（必须为 0），bit 4-7 为 lender id。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeFlag {
    pub amount: AmountMode,
    pub lender_id: u8,
}

impl ModeFlag {
    const AMOUNT_MASK: u8 = 0b0000_0011;
    const RESERVED_MASK: u8 = 0b0000_1100;
    const LENDER_SHIFT: u8 = 4;

    pub fn new(amount: AmountMode, lender_id: u8) -> PathResult<Self> {
        if lender_id > 0x0f {
            return Err(PathError::InvalidModeFlag(lender_id));
        }
        Ok(Self { amount, lender_id })
    }

    pub fn from_byte(byte: u8) -> PathResult<Self> {
        if byte & Self::RESERVED_MASK != 0 {
            return Err(PathError::InvalidModeFlag(byte));
        }
        let amount = match byte & Self::AMOUNT_MASK {
            0 => AmountMode::Exact,
            1 => AmountMode::Max,
            _ => return Err(PathError::InvalidModeFlag(byte)),
        };
        Ok(Self {
            amount,
            lender_id: byte >> Self::LENDER_SHIFT,
        })
    }

    pub fn to_byte(self) -> u8 {
        let amount = match self.amount {
            AmountMode::Exact => 0,
            AmountMode::Max => 1,
        };
        (self.lender_id << Self::LENDER_SHIFT) | amount
    }

    pub fn is_max(&self) -> bool {
        self.amount == AmountMode::Max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_codes_roundtrip_through_u8() {
        for code in 0u8..=5 {
            let action = ActionCode::try_from(code).expect("known action");
            assert_eq!(u8::from(action), code);
        }
        assert_eq!(ActionCode::try_from(6), Err(PathError::UnknownAction(6)));
    }

    #[test]
    fn flipping_only_touches_spot_codes() {
        assert_eq!(ActionCode::SwapExactIn.flipped(), ActionCode::SwapExactOut);
        assert_eq!(ActionCode::SwapExactOut.flipped(), ActionCode::SwapExactIn);
        assert_eq!(ActionCode::DebtSwap.flipped(), ActionCode::DebtSwap);
    }

    #[test]
    fn mode_flag_layout() {
        let flag = ModeFlag::from_byte(0x21).expect("valid flag");
        assert_eq!(flag.amount, AmountMode::Max);
        assert_eq!(flag.lender_id, 2);
        assert_eq!(flag.to_byte(), 0x21);

        assert_eq!(ModeFlag::from_byte(0x00).unwrap(), ModeFlag::default());
        assert_eq!(
            ModeFlag::from_byte(0x04),
            Err(PathError::InvalidModeFlag(0x04))
        );
        assert_eq!(
            ModeFlag::from_byte(0x02),
            Err(PathError::InvalidModeFlag(0x02))
        );
        assert!(ModeFlag::new(AmountMode::Exact, 16).is_err());
    }
}
