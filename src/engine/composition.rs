use std::fmt;

use crate::path::{ActionCode, Direction, Path};

use super::error::{EngineError, EngineResult};

/// 一条路径整体代表的操作，由 hop 0 的操作码决定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Composition {
    Spot,
    MarginOpen,
    MarginClose,
    CollateralSwap,
    DebtSwap,
}

/// 输入侧：闪电贷最终由哪一步偿还。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingLeg {
    Borrow,
    Withdraw,
}

/// 输出侧：兑换所得流向借贷市场的方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLeg {
    Supply,
    Repay,
}

impl Composition {
    pub fn from_action(action: ActionCode) -> Self {
        match action {
            ActionCode::SwapExactIn | ActionCode::SwapExactOut => Composition::Spot,
            ActionCode::MarginOpen => Composition::MarginOpen,
            ActionCode::MarginClose => Composition::MarginClose,
            ActionCode::CollateralSwap => Composition::CollateralSwap,
            ActionCode::DebtSwap => Composition::DebtSwap,
        }
    }

    pub fn is_leveraged(self) -> bool {
        self != Composition::Spot
    }

    pub fn funding_leg(self) -> Option<FundingLeg> {
        match self {
            Composition::Spot => None,
            Composition::MarginOpen | Composition::DebtSwap => Some(FundingLeg::Borrow),
            Composition::MarginClose | Composition::CollateralSwap => Some(FundingLeg::Withdraw),
        }
    }

    pub fn output_leg(self) -> Option<OutputLeg> {
        match self {
            Composition::Spot => None,
            Composition::MarginOpen | Composition::CollateralSwap => Some(OutputLeg::Supply),
            Composition::MarginClose | Composition::DebtSwap => Some(OutputLeg::Repay),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Composition::Spot => "spot",
            Composition::MarginOpen => "margin-open",
            Composition::MarginClose => "margin-close",
            Composition::CollateralSwap => "collateral-swap",
            Composition::DebtSwap => "debt-swap",
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 校验操作码并确定组合类型。
///
/// 杠杆操作码只允许出现在 hop 0；现货操作码必须与执行方向一致。
pub fn classify(path: &Path, direction: Direction) -> EngineResult<Composition> {
    let mut composition = None;
    for (index, hop) in path.hops().iter().enumerate() {
        let action = hop.action_code()?;
        if index == 0 {
            composition = Some(Composition::from_action(action));
        } else if !action.is_spot() {
            return Err(EngineError::LeveragedHopNotFirst { index, action });
        }
        if action.is_spot() && action != direction.spot_action() {
            return Err(EngineError::OrientationMismatch {
                index,
                action,
                direction,
            });
        }
    }
    composition.ok_or(EngineError::EmptyPath)
}
