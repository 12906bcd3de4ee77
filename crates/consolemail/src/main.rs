//! `consolemail` - Console client for Simple MAPI
//!
//! Logs on to a mail profile and exercises the Simple MAPI operations from a
//! numbered menu.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod menu;

use anyhow::Context;
use consolemail_core::{Error, Settings, StdConsole};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "consolemail=warn,consolemail_core=warn,consolemail_mapi=warn";

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the menu on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting consolemail");

    let settings = Settings::load().context("Failed to load settings")?;
    let mut session = match consolemail_core::open(settings, StdConsole::stdio()) {
        Ok(session) => session,
        Err(Error::NotInstalled) => return Ok(()),
        Err(err) => return Err(err).context("Failed to open the messaging provider"),
    };

    menu::run(&mut session).context("Console I/O failed")?;
    info!("Exiting consolemail");
    Ok(())
}
