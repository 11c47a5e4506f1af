use anyhow::{Result, anyhow};
use tracing::info;

use crate::cli::args::{Cli, Command};
use crate::cli::commands::{
    handle_fee_cmd, handle_operations_cmd, handle_path_cmd, handle_simulate_cmd,
};
use crate::cli::context::init_configs;
use crate::config::{ComposerConfig, build_composer};

/// 同步执行子命令；Prometheus exporter 挂在调用方所在的 tokio runtime 上。
pub fn run(cli: Cli, config: ComposerConfig) -> Result<()> {
    crate::monitoring::metrics::init_from_config(&config.metrics)?;

    match cli.command {
        Command::Path(cmd) => handle_path_cmd(cmd)?,
        Command::Fee(args) => handle_fee_cmd(&args, &config.flashloan)?,
        Command::Operations => {
            let composer = build_composer(&config).map_err(|err| anyhow!(err))?;
            handle_operations_cmd(composer.registry())?;
        }
        Command::Simulate(args) => {
            let mut composer = build_composer(&config).map_err(|err| anyhow!(err))?;
            info!(
                target: "cli::simulate",
                entry = %args.entry,
                caller = %args.caller,
                amount = %args.amount,
                "simulating call"
            );
            handle_simulate_cmd(&mut composer, &args)?;
        }
        Command::Init(args) => {
            init_configs(args)?;
        }
    }

    Ok(())
}
