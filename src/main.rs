use clap::Parser;
use log::warn;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

use terminal_chat::core::config::{self, ChatConfig, CliOverrides};
use terminal_chat::tui;

#[derive(Parser)]
#[command(name = "terminal-chat", about = "Streaming AI chat in your terminal")]
struct Args {
    /// Model to request (overrides config and CHAT_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Never run web searches this session
    #[arg(long)]
    no_search: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to terminal-chat.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("terminal-chat.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        warn!("{}, using defaults", e);
        ChatConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            model: args.model,
            disable_search: args.no_search,
        },
    );

    log::info!(
        "terminal-chat starting up: model={}, web_search={}",
        resolved.model_name,
        resolved.web_search
    );

    tui::run(resolved)
}
