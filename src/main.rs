use anyhow::Result;
use clap::Parser;
use ctmstitch::app::{RunOptions, run};
use ctmstitch::cli::Cli;
use ctmstitch::config::Config;
use ctmstitch::diagnostics::{DiagnosticSink, SilentSink, StderrSink};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => match Config::default_path() {
            Some(path) => Config::load_or_default(&path)?,
            None => Config::default(),
        },
    }
    .with_env_overrides();

    let options = RunOptions {
        segments: cli.segments,
        ctm_in: cli.ctm_in,
        ctm_out: cli.ctm_out,
        fail_fast: cli.fail_fast || config.resolver.fail_fast,
        strict_time_order: config.resolver.strict_time_order && !cli.no_strict_time_order,
    };
    let diag: Arc<dyn DiagnosticSink> = if cli.quiet {
        Arc::new(SilentSink)
    } else {
        Arc::new(StderrSink::new(cli.verbose))
    };

    run(&options, diag).await?;
    Ok(())
}
