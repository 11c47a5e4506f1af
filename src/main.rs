use anyhow::Result;
use clap::Parser;

use margin_composer::cli::args::Cli;
use margin_composer::cli::context::init_tracing;
use margin_composer::config::load_config;

#[tokio::main]
#[cfg_attr(feature = "hotpath", hotpath::main(percentiles = [95, 99]))]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.clone())?;
    init_tracing(&config.logging)?;
    margin_composer::cli::run(cli, config)
}
