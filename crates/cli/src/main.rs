//! # Bulk Loader CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - NDJSON 输入批量写入
//! - 优雅关闭处理（Ctrl+C 停止读取，超时放弃等待）

mod cli;
mod commands;
mod error;
mod loader;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_loader, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format,
        metrics_port: None,
        default_log_level: log_level(&cli).to_string(),
    })?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Bulk Loader CLI starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_loader(args).await,
        Commands::Validate(args) => run_validate(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Default filter when RUST_LOG is unset
fn log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        return "warn";
    }
    match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}
