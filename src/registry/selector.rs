use std::fmt;
use std::str::FromStr;

use alloy_primitives::keccak256;

use super::error::RegistryError;

/// 调用的 4 字节操作标识：`keccak256(signature)` 的前 4 字节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub [u8; 4]);

impl OperationId {
    pub const LEN: usize = 4;

    pub fn from_signature(signature: &str) -> Self {
        let digest = keccak256(signature.as_bytes());
        let mut id = [0u8; 4];
        id.copy_from_slice(&digest[..Self::LEN]);
        Self(id)
    }

    /// 取 calldata 的前 4 字节；不足 4 字节返回 `None`。
    pub fn from_calldata(calldata: &[u8]) -> Option<Self> {
        let head = calldata.get(..Self::LEN)?;
        let mut id = [0u8; 4];
        id.copy_from_slice(head);
        Some(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for OperationId {
    type Err = RegistryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(body).map_err(|_| RegistryError::InvalidOperationId(raw.to_string()))?;
        let id: [u8; 4] = bytes
            .try_into()
            .map_err(|_| RegistryError::InvalidOperationId(raw.to_string()))?;
        Ok(Self(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_well_known_selectors() {
        assert_eq!(
            OperationId::from_signature("transfer(address,uint256)").to_string(),
            "0xa9059cbb"
        );
        assert_eq!(
            OperationId::from_signature("balanceOf(address)").to_string(),
            "0x70a08231"
        );
    }

    #[test]
    fn parses_hex_and_calldata() {
        let id: OperationId = "0xa9059cbb".parse().unwrap();
        assert_eq!(id.0, [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(OperationId::from_calldata(&[0xa9, 0x05, 0x9c, 0xbb, 0x01]), Some(id));
        assert_eq!(OperationId::from_calldata(&[0xa9, 0x05]), None);
        assert!("0xa9059c".parse::<OperationId>().is_err());
    }
}
