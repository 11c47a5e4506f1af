use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::flashloan::FeeMode;

#[derive(Parser, Debug)]
#[command(name = "composer", version, about = "杠杆交易组合引擎")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 composer.toml 或 config/composer.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 路径编码工具
    #[command(subcommand)]
    Path(PathCmd),
    /// 计算闪电贷费用与借入规模
    Fee(FeeArgs),
    /// 列出 façade 上注册的全部操作
    Operations,
    /// 按配置装配引擎并执行一次调用
    Simulate(SimulateArgs),
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
pub struct InitCmd {
    #[arg(long, value_name = "DIR", help = "可选输出目录（默认当前目录）")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}

#[derive(Subcommand, Debug)]
pub enum PathCmd {
    /// 由逐跳参数生成路径十六进制
    Encode(PathEncodeArgs),
    /// 解析路径十六进制
    Decode {
        #[arg(value_name = "HEX")]
        path: String,
    },
    /// 生成反向路径（ExactIn <-> ExactOut）
    Reverse {
        #[arg(value_name = "HEX")]
        path: String,
    },
}

#[derive(Args, Debug)]
pub struct PathEncodeArgs {
    #[arg(long, value_parser = parse_address, help = "起始代币")]
    pub start: Address,
    #[arg(
        long = "hop",
        value_name = "FEE:PROVIDER:ACTION:TOKEN",
        required = true,
        help = "单跳参数，可重复；ACTION 为数字或名称（如 swap-exact-in）"
    )]
    pub hops: Vec<String>,
    #[arg(long, help = "附加 mode flag 并使用 withdraw-all / repay-all")]
    pub max: bool,
    #[arg(long, value_name = "ID", help = "附加 mode flag 并指定 lender id")]
    pub lender: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeeModeArg {
    Surcharge,
    Deducted,
}

impl From<FeeModeArg> for FeeMode {
    fn from(value: FeeModeArg) -> Self {
        match value {
            FeeModeArg::Surcharge => FeeMode::Surcharge,
            FeeModeArg::Deducted => FeeMode::Deducted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeeSolve {
    /// amount 为借入总额
    Gross,
    /// amount 为必须交付的数量
    Input,
    /// amount 为可承担的归还上限
    Budget,
}

#[derive(Args, Debug)]
pub struct FeeArgs {
    #[arg(long, value_parser = parse_u256)]
    pub amount: U256,
    #[arg(long, help = "费率分子（默认取配置）")]
    pub fee: Option<u64>,
    #[arg(long, help = "费率分母（默认取配置）")]
    pub denom: Option<u64>,
    #[arg(long, value_enum, help = "收费方式（默认取配置）")]
    pub mode: Option<FeeModeArg>,
    #[arg(long, value_enum, default_value_t = FeeSolve::Gross)]
    pub solve: FeeSolve,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, help = "入口名，如 swapExactIn / openMarginPositionExactOut")]
    pub entry: String,
    #[arg(long, value_parser = parse_address)]
    pub caller: Address,
    #[arg(long, value_parser = parse_u256)]
    pub amount: U256,
    #[arg(
        long,
        value_parser = parse_u256,
        help = "滑点限制；ExactIn 默认 0，ExactOut 默认 U256::MAX"
    )]
    pub limit: Option<U256>,
    #[arg(long, value_name = "HEX")]
    pub path: String,
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, String> {
    raw.trim()
        .parse::<Address>()
        .map_err(|err| format!("地址 {raw} 非法: {err}"))
}

pub(crate) fn parse_u256(raw: &str) -> Result<U256, String> {
    let trimmed = raw.trim().replace('_', "");
    trimmed
        .parse::<U256>()
        .map_err(|err| format!("数值 {raw} 非法: {err}"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate() {
        let cli = Cli::try_parse_from([
            "composer",
            "simulate",
            "--entry",
            "swapExactIn",
            "--caller",
            "0x00000000000000000000000000000000000000ca",
            "--amount",
            "1_000_000",
            "--path",
            "0x00",
        ])
        .unwrap();
        match cli.command {
            Command::Simulate(args) => {
                assert_eq!(args.amount, U256::from(1_000_000u64));
                assert_eq!(args.limit, None);
                assert_eq!(args.caller, Address::with_last_byte(0xca));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_address() {
        assert!(parse_address("0x12").is_err());
        assert_eq!(parse_u256("0x10"), Ok(U256::from(16)));
    }
}
