pub mod app;
pub mod config;
mod error;
pub mod mailchimp;
pub mod web;

// re-exports
pub use app::{router, serve, App, AppState};
pub use error::{Error, Result};
pub use mailchimp::{ListClient, MailchimpClient};

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Human readable tracing for local development.
/// Defaults to the `debug` level unless `RUST_LOG` says otherwise.
pub fn init_dbg_tracing() {
    tracing_subscriber::fmt()
        .without_time()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_env_filter(env_filter("debug"))
        .compact()
        .init();
}

/// JSON lines for production, one object per event.
pub fn init_production_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_target(false)
        .with_env_filter(env_filter("info"))
        .init();
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}
