use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow, bail};

use crate::cli::args::{PathCmd, PathEncodeArgs, parse_address};
use crate::path::{ActionCode, AmountMode, ModeFlag, Path, PathBuilder};

pub fn handle_path_cmd(cmd: PathCmd) -> Result<()> {
    let output = match cmd {
        PathCmd::Encode(args) => encode_path(&args)?.to_hex(),
        PathCmd::Decode { path } => describe_path(&Path::from_hex(&path)?)?,
        PathCmd::Reverse { path } => reverse_path(&path)?,
    };
    println!("{output}");
    Ok(())
}

fn reverse_path(raw: &str) -> Result<String> {
    Ok(Path::from_hex(raw)?.reversed().to_hex())
}

fn encode_path(args: &PathEncodeArgs) -> Result<Path> {
    let mut builder = PathBuilder::new(args.start);
    for raw in &args.hops {
        let (fee, provider_id, action, next) = parse_hop(raw)?;
        builder = builder.hop(fee, provider_id, action, next);
    }
    if args.max || args.lender.is_some() {
        let amount = if args.max {
            AmountMode::Max
        } else {
            AmountMode::Exact
        };
        builder = builder.mode(ModeFlag::new(amount, args.lender.unwrap_or_default())?);
    }
    Ok(builder.build()?)
}

/// `FEE:PROVIDER:ACTION:TOKEN`
fn parse_hop(raw: &str) -> Result<(u32, u8, u8, alloy_primitives::Address)> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [fee, provider, action, token] = parts.as_slice() else {
        bail!("hop 参数 {raw} 应为 FEE:PROVIDER:ACTION:TOKEN");
    };
    let fee: u32 = fee.parse().with_context(|| format!("hop {raw} 的 fee 非法"))?;
    let provider: u8 = provider
        .parse()
        .with_context(|| format!("hop {raw} 的 provider 非法"))?;
    let action = parse_action(action)?;
    let token = parse_address(token).map_err(|err| anyhow!(err))?;
    Ok((fee, provider, action, token))
}

fn parse_action(raw: &str) -> Result<u8> {
    if let Ok(code) = raw.parse::<u8>() {
        return Ok(code);
    }
    (0u8..=5)
        .filter_map(|code| ActionCode::try_from(code).ok())
        .find(|action| action.as_str() == raw)
        .map(u8::from)
        .ok_or_else(|| anyhow!("未知的 action: {raw}"))
}

fn describe_path(path: &Path) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{path}")?;
    for leg in path.legs() {
        let action = leg
            .hop
            .action_code()
            .map(|code| code.as_str().to_string())
            .unwrap_or_else(|_| format!("action#{}", leg.hop.action));
        writeln!(
            out,
            "  hop {}: {} -> {} fee={} provider={} {}",
            leg.index, leg.head, leg.tail, leg.hop.fee, leg.hop.provider_id, action
        )?;
    }
    if path.mode_byte().is_some() {
        let mode = path.mode()?;
        write!(out, "  mode: amount={:?} lender={}", mode.amount, mode.lender_id)?;
    } else {
        write!(out, "  mode: 无")?;
    }
    Ok(out)
}
