//! Crosspost - connect social accounts from the terminal
//!
//! This is the binary entry point. The connection flow lives in the
//! workspace crates; this wires it to the system browser.

use clap::{Parser, Subcommand};
use url::Url;

use crosspost_connect::{
    ConnectSettings, ConnectionWizard, HttpConnectionClient, MessageBus, PopupController,
    WizardStep,
};
use crosspost_core::prelude::*;
use crosspost_core::{PlatformId, ALL_PLATFORMS};

mod browser;

use browser::{LoopbackBrowser, DEFAULT_CALLBACK_PORT};

/// Crosspost - connect social accounts from the terminal
#[derive(Parser, Debug)]
#[command(name = "crosspost")]
#[command(about = "Connect social accounts to Crosspost", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect a social account via OAuth in your browser
    Connect {
        /// Platform to connect (e.g. linkedin, twitter)
        platform: PlatformId,

        /// Backend API base URL (overrides config)
        #[arg(long)]
        api: Option<Url>,

        /// Loopback port for the OAuth redirect
        #[arg(long, default_value_t = DEFAULT_CALLBACK_PORT)]
        port: u16,
    },

    /// List supported platforms
    Platforms,
}

#[tokio::main]
async fn main() -> Result<()> {
    crosspost_core::logging::init()?;
    let args = Args::parse();

    match args.command {
        Command::Platforms => {
            for platform in ALL_PLATFORMS {
                let info = platform.info();
                println!("{:<12} {}", platform.as_str(), info.description);
            }
            Ok(())
        }
        Command::Connect {
            platform,
            api,
            port,
        } => connect(platform, api, port).await,
    }
}

async fn connect(platform: PlatformId, api: Option<Url>, port: u16) -> Result<()> {
    let mut settings = ConnectSettings::load()?;
    if let Some(api) = api {
        settings.api_base = api;
    }

    let info = platform.info();
    eprintln!("Connecting {}. This will grant Crosspost:", info.display_name);
    for permission in info.required_permissions {
        eprintln!("  • {permission}");
    }
    eprintln!();

    let bus = MessageBus::new();
    let driver = LoopbackBrowser::new(bus.clone(), port);
    let origin = driver.origin();
    let popup = PopupController::with_settings(driver, bus, origin, &settings);
    let client = HttpConnectionClient::new(settings.api_base.clone())?;
    let mut wizard = ConnectionWizard::with_platform(client, popup, platform);

    eprintln!("Opening your browser to authorize {}...", info.display_name);
    wizard.authorize().await;

    match wizard.step() {
        WizardStep::Complete => {
            if let Some(connection) = wizard.connection() {
                eprintln!(
                    "✅ Connected {} as {}",
                    connection.platform.info().display_name,
                    connection.account_name
                );
            }
            Ok(())
        }
        _ => {
            if let Some(err) = wizard.last_error() {
                eprintln!("❌ {err}");
                if matches!(err, Error::PopupBlocked) {
                    eprintln!("   Could not open a browser on this system.");
                }
            }
            std::process::exit(1);
        }
    }
}
