mod action;
mod codec;
mod error;

use std::fmt;

use alloy_primitives::Address;

pub use action::{ActionCode, AmountMode, Direction, ModeFlag};
pub use codec::{ADDRESS_LEN, FEE_LEN, HOP_LEN, decode, encode, encoded_len};
pub use error::{PathError, PathResult};

/// 24 位 fee / 参数字段的上限。
pub const MAX_FEE: u32 = 0x00ff_ffff;

/// 路径中的单跳：`token` 为该跳的头部代币，尾部代币由下一跳（或终点代币）给出。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hop {
    pub token: Address,
    pub fee: u32,
    pub provider_id: u8,
    pub action: u8,
}

impl Hop {
    pub fn new(token: Address, fee: u32, provider_id: u8, action: impl Into<u8>) -> Self {
        Self {
            token,
            fee,
            provider_id,
            action: action.into(),
        }
    }

    pub fn action_code(&self) -> PathResult<ActionCode> {
        ActionCode::try_from(self.action)
    }
}

/// 遍历路径时的单跳视图，`head`/`tail` 按编码顺序给出。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLeg<'a> {
    pub index: usize,
    pub hop: &'a Hop,
    pub head: Address,
    pub tail: Address,
}

impl PathLeg<'_> {
    /// 按执行方向给出 (token_in, token_out)。
    pub fn oriented(&self, direction: Direction) -> (Address, Address) {
        match direction {
            Direction::ExactIn => (self.head, self.tail),
            Direction::ExactOut => (self.tail, self.head),
        }
    }
}

/// 解码后的强类型路径。N 个 hop 对应 N + 1 个代币。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    hops: Vec<Hop>,
    final_token: Address,
    mode: Option<u8>,
}

impl Path {
    pub fn new(hops: Vec<Hop>, final_token: Address, mode: Option<u8>) -> PathResult<Self> {
        if let Some((index, hop)) = hops.iter().enumerate().find(|(_, hop)| hop.fee > MAX_FEE) {
            return Err(PathError::FeeOutOfRange {
                index,
                fee: hop.fee,
            });
        }
        Ok(Self {
            hops,
            final_token,
            mode,
        })
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn final_token(&self) -> Address {
        self.final_token
    }

    pub fn first_token(&self) -> Address {
        self.hops
            .first()
            .map(|hop| hop.token)
            .unwrap_or(self.final_token)
    }

    pub fn mode_byte(&self) -> Option<u8> {
        self.mode
    }

    /// 解析末尾 mode flag；缺省等价于 `0`。
    pub fn mode(&self) -> PathResult<ModeFlag> {
        self.mode
            .map(ModeFlag::from_byte)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.hops.iter().map(|hop| hop.token).collect();
        tokens.push(self.final_token);
        tokens
    }

    /// 给定方向下整条路径的 (token_in, token_out)。
    pub fn endpoints(&self, direction: Direction) -> (Address, Address) {
        match direction {
            Direction::ExactIn => (self.first_token(), self.final_token),
            Direction::ExactOut => (self.final_token, self.first_token()),
        }
    }

    pub fn legs(&self) -> impl Iterator<Item = PathLeg<'_>> + '_ {
        self.hops.iter().enumerate().map(move |(index, hop)| {
            let tail = self
                .hops
                .get(index + 1)
                .map(|next| next.token)
                .unwrap_or(self.final_token);
            PathLeg {
                index,
                hop,
                head: hop.token,
                tail,
            }
        })
    }

    /// 生成相反朝向的路径：代币顺序倒置，现货操作码互换，mode flag 保留。
    ///
    /// 杠杆操作码只能出现在第一跳，因此源路径第一跳的杠杆码会移到新路径的
    /// 第一跳上，其余各跳统一使用新朝向的现货操作码。
    pub fn reversed(&self) -> Path {
        let tokens = self.tokens();
        let count = self.hops.len();
        let leading = self
            .hops
            .first()
            .and_then(|hop| ActionCode::try_from(hop.action).ok())
            .filter(|code| !code.is_spot());
        let spot = self
            .hops
            .iter()
            .filter_map(|hop| ActionCode::try_from(hop.action).ok())
            .find(|code| code.is_spot())
            .unwrap_or(ActionCode::SwapExactIn)
            .flipped();

        let hops = (0..count)
            .map(|i| {
                let source = &self.hops[count - 1 - i];
                let action = match (i, leading) {
                    (0, Some(code)) => u8::from(code),
                    (_, Some(_)) => u8::from(spot),
                    (_, None) => ActionCode::try_from(source.action)
                        .map(|code| u8::from(code.flipped()))
                        .unwrap_or(source.action),
                };
                Hop {
                    token: tokens[count - i],
                    fee: source.fee,
                    provider_id: source.provider_id,
                    action,
                }
            })
            .collect();
        Path {
            hops,
            final_token: tokens[0],
            mode: self.mode,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(encode(self)))
    }

    pub fn from_hex(raw: &str) -> PathResult<Self> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(body)?;
        decode(&bytes)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hop in &self.hops {
            let action = ActionCode::try_from(hop.action)
                .map(|code| code.as_str().to_string())
                .unwrap_or_else(|_| format!("action#{}", hop.action));
            write!(
                f,
                "{} -[fee={} provider={} {}]-> ",
                hop.token, hop.fee, hop.provider_id, action
            )?;
        }
        write!(f, "{}", self.final_token)?;
        if let Some(mode) = self.mode {
            write!(f, " (mode={mode:#04x})")?;
        }
        Ok(())
    }
}

/// 逐跳构造路径。
#[derive(Debug, Clone)]
pub struct PathBuilder {
    hops: Vec<Hop>,
    current: Address,
    mode: Option<u8>,
}

impl PathBuilder {
    pub fn new(start: Address) -> Self {
        Self {
            hops: Vec::new(),
            current: start,
            mode: None,
        }
    }

    pub fn hop(
        mut self,
        fee: u32,
        provider_id: u8,
        action: impl Into<u8>,
        next_token: Address,
    ) -> Self {
        self.hops
            .push(Hop::new(self.current, fee, provider_id, action));
        self.current = next_token;
        self
    }

    pub fn mode(mut self, mode: ModeFlag) -> Self {
        self.mode = Some(mode.to_byte());
        self
    }

    pub fn raw_mode(mut self, mode: u8) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn build(self) -> PathResult<Path> {
        Path::new(self.hops, self.current, self.mode)
    }
}

#[cfg(test)]
mod tests;
