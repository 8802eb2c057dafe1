use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(args.log_directive().parse()?))
        .with_writer(std::io::stderr)
        .init();

    debug!("{:?}", args);

    let report = commands::analyze::run(
        &args.log_file,
        args.analyze_options(),
        args.report_style(),
    )?;
    print!("{}", report);

    Ok(())
}
