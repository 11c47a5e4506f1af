use alloy_primitives::{Address, U256};

use crate::registry::calldata::{LensArgs, encode_word};
use crate::registry::{Call, CallEnv, DispatchError, DispatchResult, Module, OperationId};

pub const BALANCE_OF: &str = "balanceOf(address,address)";
pub const COLLATERAL_OF: &str = "collateralOf(address,address,uint8)";
pub const DEBT_OF: &str = "debtOf(address,address,uint8)";

/// 只读查询：钱包余额与借贷仓位。
#[derive(Debug, Clone, Copy)]
pub struct LensModule {
    address: Address,
}

impl LensModule {
    pub fn new(address: Address) -> Self {
        Self { address }
    }
}

impl Module for LensModule {
    fn address(&self) -> Address {
        self.address
    }

    fn name(&self) -> &'static str {
        "lens"
    }

    fn operations(&self) -> Vec<OperationId> {
        [BALANCE_OF, COLLATERAL_OF, DEBT_OF]
            .into_iter()
            .map(OperationId::from_signature)
            .collect()
    }

    fn invoke(&self, env: &mut CallEnv<'_>, call: &Call<'_>) -> DispatchResult<Vec<u8>> {
        let value: U256 = if call.operation == OperationId::from_signature(BALANCE_OF) {
            let args = LensArgs::decode(call.operation, call.args, false)?;
            env.state.balance_of(args.token, args.holder)
        } else if call.operation == OperationId::from_signature(COLLATERAL_OF) {
            let args = LensArgs::decode(call.operation, call.args, true)?;
            let lender = env.lenders.lender(args.lender_id.unwrap_or_default())?;
            lender.collateral_of(env.state, args.holder, args.token)
        } else if call.operation == OperationId::from_signature(DEBT_OF) {
            let args = LensArgs::decode(call.operation, call.args, true)?;
            let lender = env.lenders.lender(args.lender_id.unwrap_or_default())?;
            lender.debt_of(env.state, args.holder, args.token)
        } else {
            return Err(DispatchError::UnrecognizedOperation {
                selector: Some(call.operation),
            });
        };
        Ok(encode_word(value).to_vec())
    }
}
