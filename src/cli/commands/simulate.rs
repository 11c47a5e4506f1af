use alloy_primitives::U256;
use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::cli::args::SimulateArgs;
use crate::engine::{Composition, Interpreter};
use crate::modules::trade_entry_by_name;
use crate::path::{Direction, Path};
use crate::registry::Composer;
use crate::registry::calldata::{decode_word, encode_trade_call};

/// 在内存中的 façade 上执行一次交易入口，并打印调用方余额变化。
pub fn handle_simulate_cmd(composer: &mut Composer, args: &SimulateArgs) -> Result<()> {
    let entry = trade_entry_by_name(&args.entry)
        .ok_or_else(|| anyhow!("未知的交易入口: {}", args.entry))?;
    let path = Path::from_hex(&args.path)?;
    let limit = args.limit.unwrap_or(match entry.direction {
        Direction::ExactIn => U256::ZERO,
        Direction::ExactOut => U256::MAX,
    });

    if entry.composition == Composition::Spot {
        let interpreter = Interpreter::new(
            composer.address(),
            composer.venues(),
            composer.lenders(),
            composer.flash_provider(),
        );
        match interpreter.quote(composer.state(), &path, entry.direction, args.amount) {
            Ok((fills, quoted)) => {
                info!(target: "cli::simulate", hops = fills.len(), %quoted, "quote preview")
            }
            Err(err) => warn!(target: "cli::simulate", error = %err, "quote preview failed"),
        }
    }

    let tokens = path.tokens();
    let before: Vec<U256> = tokens
        .iter()
        .map(|token| composer.state().balance_of(*token, args.caller))
        .collect();

    let calldata = encode_trade_call(entry.operation(), args.amount, limit, &path);
    match composer.call(args.caller, &calldata) {
        Ok(output) => {
            let settled = decode_word(&output).unwrap_or_default();
            println!("{} settled={settled}", entry.name());
            for (token, before) in tokens.iter().zip(before) {
                let after = composer.state().balance_of(*token, args.caller);
                if after != before {
                    println!("  {token}: {before} -> {after}");
                }
            }
            Ok(())
        }
        Err(err) => {
            println!("{} reverted [{}]: {err}", entry.name(), err.category().as_str());
            Err(anyhow!(err))
        }
    }
}
