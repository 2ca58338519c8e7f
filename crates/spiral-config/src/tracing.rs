// SPDX-License-Identifier: AGPL-3.0-or-later
// © 2025 Ryo ∴ SpiralArchitect (kishkavsesvit@icloud.com)
// Part of SpiralTorch — Licensed under AGPL-3.0-or-later.
// Unauthorized derivative works or closed redistribution prohibited under AGPL §13.

use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

const LEVEL_VAR: &str = "SPIRAL_LOG";

/// Configures the global tracing subscriber.
///
/// `RUST_LOG` wins when present; otherwise `SPIRAL_LOG` supplies the
/// directive, and `info` is used when neither is set.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_default_env().or_else(|_| fallback_filter())?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stdout().is_terminal());

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| InitError::Subscriber(err.to_string()))
}

fn fallback_filter() -> Result<EnvFilter, InitError> {
    match std::env::var(LEVEL_VAR) {
        Ok(raw) if !raw.trim().is_empty() => {
            EnvFilter::try_new(raw.trim()).map_err(|err| InitError::Directive {
                directive: raw.clone(),
                message: err.to_string(),
            })
        }
        Ok(_) | Err(std::env::VarError::NotPresent) => Ok(EnvFilter::new("info")),
        Err(err) => Err(InitError::Env(err)),
    }
}

/// Errors emitted when configuring the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("tracing has already been initialised")]
    AlreadyInitialised,
    #[error("failed to read SPIRAL_LOG: {0}")]
    Env(std::env::VarError),
    #[error("invalid SPIRAL_LOG directive {directive:?}: {message}")]
    Directive { directive: String, message: String },
    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}
