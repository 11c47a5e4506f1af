use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("路径长度非法: {len} 字节不满足 20 + 25k (+1)")]
    Malformed { len: usize },
    #[error("hop {index} 的 fee 超出 24 位: {fee}")]
    FeeOutOfRange { index: usize, fee: u32 },
    #[error("未知的 action code: {0}")]
    UnknownAction(u8),
    #[error("mode flag 非法: {0:#04x}")]
    InvalidModeFlag(u8),
    #[error("路径十六进制解析失败: {0}")]
    Hex(String),
}

impl From<hex::FromHexError> for PathError {
    fn from(err: hex::FromHexError) -> Self {
        PathError::Hex(err.to_string())
    }
}

pub type PathResult<T> = Result<T, PathError>;
