//! Daily Task Tracker bot binary.
//!
//! Start the bot with:
//! ```bash
//! TELEGRAM_BOT_TOKEN=xxx GOOGLE_SHEETS_ID=xxx GOOGLE_SHEETS_CREDENTIALS=key.json \
//!     cargo run -p tracker-telegram
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracker_core::{BotConfig, SheetsClient};
use tracker_telegram::{create_shared_state, TaskBot};

/// Daily Task Tracker - log task updates from Telegram to Google Sheets
#[derive(Parser, Debug)]
#[command(name = "tracker-telegram")]
#[command(about = "Telegram bot that records task updates in Google Sheets")]
struct Args {
    /// Use long polling even when a webhook URL is configured
    #[arg(long)]
    polling: bool,

    /// Environment file to load before reading configuration
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.env_file.exists() {
        if let Err(e) = dotenvy::from_path(&args.env_file) {
            eprintln!("Warning: could not load {}: {}", args.env_file.display(), e);
        }
    }

    // Initialize logging based on verbosity; RUST_LOG wins when set
    let filter = match args.verbose {
        0 => "tracker_telegram=info,tracker_core=info,teloxide=warn",
        1 => "tracker_telegram=debug,tracker_core=debug,teloxide=info",
        2 => "tracker_telegram=trace,tracker_core=trace,teloxide=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    let client = SheetsClient::from_config(&config)?;

    match client.ensure_header().await {
        Ok(true) => tracing::info!("Added header row to worksheet"),
        Ok(false) => {}
        Err(e) => tracing::warn!(kind = e.kind(), error = %e, "Could not verify header row"),
    }

    let state = create_shared_state(Arc::clone(&config), Arc::new(client));
    let bot = TaskBot::new(state);

    let webhook = config.webhook_endpoint().filter(|_| !args.polling);

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\n[robot] Daily Task Tracker Bot");
            println!("   Bot: @{}", username);
        }
        Err(e) => tracing::error!(error = %e, "Failed to get bot info"),
    }
    println!("   Sheet: {}", config.sheet_id_preview());
    match &webhook {
        Some(url) => println!("   Mode: webhook ({})", url),
        None => println!("   Mode: polling"),
    }
    println!("   Health: http://0.0.0.0:{}/", config.port);
    println!("\nPress Ctrl+C to stop.\n");

    bot.run(args.polling).await?;

    Ok(())
}
