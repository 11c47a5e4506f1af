//! 入口 calldata 的编解码：`[selector 4B][amount 32B][limit 32B][path ...]`，数字均为大端。

use alloy_primitives::{Address, U256};

use crate::path::{self, Path};

use super::error::{DispatchError, DispatchResult};
use super::selector::OperationId;

pub const WORD_LEN: usize = 32;

pub fn encode_word(value: U256) -> [u8; WORD_LEN] {
    value.to_be_bytes::<WORD_LEN>()
}

pub fn decode_word(bytes: &[u8]) -> Option<U256> {
    (bytes.len() == WORD_LEN).then(|| U256::from_be_slice(bytes))
}

/// 交易类入口的参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeArgs {
    pub amount: U256,
    pub limit: U256,
    pub path: Path,
}

impl TradeArgs {
    pub fn decode(operation: OperationId, args: &[u8]) -> DispatchResult<Self> {
        if args.len() < 2 * WORD_LEN {
            return Err(DispatchError::MalformedCalldata {
                operation,
                reason: "缺少 amount / limit",
            });
        }
        let amount = U256::from_be_slice(&args[..WORD_LEN]);
        let limit = U256::from_be_slice(&args[WORD_LEN..2 * WORD_LEN]);
        let path = path::decode(&args[2 * WORD_LEN..]).map_err(crate::engine::EngineError::from)?;
        Ok(Self {
            amount,
            limit,
            path,
        })
    }
}

pub fn encode_trade_call(operation: OperationId, amount: U256, limit: U256, path: &Path) -> Vec<u8> {
    let encoded = path.to_bytes();
    let mut calldata = Vec::with_capacity(OperationId::LEN + 2 * WORD_LEN + encoded.len());
    calldata.extend_from_slice(operation.as_bytes());
    calldata.extend_from_slice(&encode_word(amount));
    calldata.extend_from_slice(&encode_word(limit));
    calldata.extend_from_slice(&encoded);
    calldata
}

/// 查询类入口的参数：`[token 20B][holder 20B][lender id 1B, 可选]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LensArgs {
    pub token: Address,
    pub holder: Address,
    pub lender_id: Option<u8>,
}

impl LensArgs {
    const BASE_LEN: usize = 2 * path::ADDRESS_LEN;

    pub fn decode(operation: OperationId, args: &[u8], with_lender: bool) -> DispatchResult<Self> {
        let expected = Self::BASE_LEN + usize::from(with_lender);
        if args.len() != expected {
            return Err(DispatchError::MalformedCalldata {
                operation,
                reason: "查询参数长度不符",
            });
        }
        Ok(Self {
            token: Address::from_slice(&args[..path::ADDRESS_LEN]),
            holder: Address::from_slice(&args[path::ADDRESS_LEN..Self::BASE_LEN]),
            lender_id: with_lender.then(|| args[Self::BASE_LEN]),
        })
    }

    pub fn encode(&self, operation: OperationId) -> Vec<u8> {
        let mut calldata = Vec::with_capacity(OperationId::LEN + Self::BASE_LEN + 1);
        calldata.extend_from_slice(operation.as_bytes());
        calldata.extend_from_slice(self.token.as_slice());
        calldata.extend_from_slice(self.holder.as_slice());
        if let Some(id) = self.lender_id {
            calldata.push(id);
        }
        calldata
    }
}
