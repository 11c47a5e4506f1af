use anyhow::Result;

use crate::cli::args::{FeeArgs, FeeSolve};
use crate::config::FlashloanConfig;
use crate::flashloan::{FeeMode, FeeRate, FlashTerms};

pub fn handle_fee_cmd(args: &FeeArgs, defaults: &FlashloanConfig) -> Result<()> {
    let (rate, mode, terms) = solve(args, defaults)?;
    println!(
        "rate={}/{} mode={} gross={} fee={} delivered={} owed={}",
        rate.fee(),
        rate.denom(),
        mode.as_str(),
        terms.gross,
        terms.fee,
        terms.delivered,
        terms.owed
    );
    Ok(())
}

fn solve(args: &FeeArgs, defaults: &FlashloanConfig) -> Result<(FeeRate, FeeMode, FlashTerms)> {
    let rate = FeeRate::new(
        args.fee.unwrap_or(defaults.fee),
        args.denom.unwrap_or(defaults.denom),
    )?;
    let mode = args.mode.map(FeeMode::from).unwrap_or(defaults.mode);
    let terms = match args.solve {
        FeeSolve::Gross => rate.terms(args.amount, mode)?,
        FeeSolve::Input => rate.size_for_input(args.amount, mode)?,
        FeeSolve::Budget => rate.size_for_budget(args.amount, mode)?,
    };
    Ok((rate, mode, terms))
}
