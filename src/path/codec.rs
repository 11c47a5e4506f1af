use alloy_primitives::Address;

use super::error::{PathError, PathResult};
use super::{Hop, Path};

pub const ADDRESS_LEN: usize = 20;
pub const FEE_LEN: usize = 3;
/// `[token 20B][fee 3B][provider 1B][action 1B]`
pub const HOP_LEN: usize = ADDRESS_LEN + FEE_LEN + 2;

pub fn encoded_len(path: &Path) -> usize {
    path.len() * HOP_LEN + ADDRESS_LEN + usize::from(path.mode_byte().is_some())
}

/// 将路径编码为紧凑字节流；`decode` 的严格逆运算。
pub fn encode(path: &Path) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(path));
    for hop in path.hops() {
        out.extend_from_slice(hop.token.as_slice());
        // Path::new 已保证 fee 不超过 24 位
        out.extend_from_slice(&hop.fee.to_be_bytes()[1..]);
        out.push(hop.provider_id);
        out.push(hop.action);
    }
    out.extend_from_slice(path.final_token().as_slice());
    if let Some(mode) = path.mode_byte() {
        out.push(mode);
    }
    out
}

/// 顺序切片解码。只校验长度是否满足 `20 + 25k (+1)`。
pub fn decode(bytes: &[u8]) -> PathResult<Path> {
    let len = bytes.len();
    if len < ADDRESS_LEN {
        return Err(PathError::Malformed { len });
    }
    let body = len - ADDRESS_LEN;
    let hop_count = body / HOP_LEN;
    let has_mode = match body % HOP_LEN {
        0 => false,
        1 => true,
        _ => return Err(PathError::Malformed { len }),
    };

    let mut hops = Vec::with_capacity(hop_count);
    for chunk in bytes[..hop_count * HOP_LEN].chunks_exact(HOP_LEN) {
        let token = Address::from_slice(&chunk[..ADDRESS_LEN]);
        let fee = u32::from_be_bytes([
            0,
            chunk[ADDRESS_LEN],
            chunk[ADDRESS_LEN + 1],
            chunk[ADDRESS_LEN + 2],
        ]);
        hops.push(Hop {
            token,
            fee,
            provider_id: chunk[ADDRESS_LEN + FEE_LEN],
            action: chunk[ADDRESS_LEN + FEE_LEN + 1],
        });
    }

    let tail = hop_count * HOP_LEN;
    let final_token = Address::from_slice(&bytes[tail..tail + ADDRESS_LEN]);
    let mode = has_mode.then(|| bytes[len - 1]);

    Path::new(hops, final_token, mode)
}
