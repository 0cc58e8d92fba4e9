//! Tries to create an `AppConfig` from config files and the environment.
//! Sources are layered with `figment`, later ones override earlier ones:
//! `base.toml` -> `{environment}.toml` -> `APP_*` env vars -> `MAIL_CHIMP_*` and `PORT` env vars.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    value::{Uncased, UncasedStr},
    Figment,
};
use tracing::info;

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, Environment, MailchimpConfig, MailchimpCredentials, NetConfig};

/// Raw environment variables that are read without the `APP_` prefix.
const RAW_ENV_VARS: [&str; 4] = [
    MailchimpConfig::API_KEY_VAR,
    MailchimpConfig::LIST_ID_VAR,
    MailchimpConfig::SERVER_VAR,
    "PORT",
];

impl AppConfig {
    /// Builds the configuration from `config_dir` and the process environment.
    /// Fails if the Mailchimp credentials are missing.
    pub fn load(config_dir: &Path, environment: Environment) -> ConfigResult<Self> {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        let config: AppConfig = Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::raw().only(&RAW_ENV_VARS).map(raw_env_key_to_path))
            .extract()?;

        // Fail early, the server is useless without them.
        config.mailchimp_config.credentials()?;

        Ok(config)
    }
}

/// Maps the well-known raw environment variables onto their config paths.
fn raw_env_key_to_path(key: &UncasedStr) -> Uncased<'_> {
    let path = match key.as_str().to_ascii_uppercase().as_str() {
        MailchimpConfig::API_KEY_VAR => "mailchimp_config.api_key",
        MailchimpConfig::LIST_ID_VAR => "mailchimp_config.list_id",
        MailchimpConfig::SERVER_VAR => "mailchimp_config.server",
        "PORT" => "net_config.app_port",
        _ => return key.as_str().into(),
    };
    path.into()
}

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!(
            "{:<12} - Initializing the configuration",
            "get_or_init_config"
        );
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        let config_dir = base_path.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()
            .expect("Failed to parse APP_ENVIRONMENT.");

        AppConfig::load(&config_dir, environment)
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

// ###################################
// ->   TESTS
// ###################################
