//! The configuration structs used to build the AppConfig, and their impls.
use std::{path::PathBuf, time::Duration};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub mailchimp_config: MailchimpConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
    pub static_dir: PathBuf,
}

/// Everything needed to talk to the Mailchimp Marketing API.
///
/// The credentials are optional here so that a missing variable can be reported by name,
/// see [`MailchimpConfig::credentials`].
#[derive(Deserialize, Clone, Debug)]
pub struct MailchimpConfig {
    pub api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub list_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server: Option<String>,
    /// Overrides the API root derived from `server`.
    pub base_url: Option<String>,
    pub timeout_millis: u64,
}

/// Credentials that passed the presence check.
#[derive(Clone, Debug)]
pub struct MailchimpCredentials {
    pub api_key: SecretString,
    pub list_id: String,
    pub server: String,
}

// ###################################
// ->   IMPLs
// ###################################
impl MailchimpConfig {
    pub const API_KEY_VAR: &'static str = "MAIL_CHIMP_KEY";
    pub const LIST_ID_VAR: &'static str = "MAIL_CHIMP_ID";
    pub const SERVER_VAR: &'static str = "MAIL_CHIMP_SERVER";

    /// Fails with the name of the first required variable that is absent or empty.
    pub fn credentials(&self) -> ConfigResult<MailchimpCredentials> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().is_empty())
            .ok_or(ConfigError::MissingEnvVar(Self::API_KEY_VAR))?;
        let list_id = non_empty(&self.list_id).ok_or(ConfigError::MissingEnvVar(Self::LIST_ID_VAR))?;
        let server = non_empty(&self.server).ok_or(ConfigError::MissingEnvVar(Self::SERVER_VAR))?;

        Ok(MailchimpCredentials {
            api_key,
            list_id,
            server,
        })
    }

    /// The API root, always ending with a '/' so that relative paths can be joined onto it.
    pub fn api_base_url(&self, server: &str) -> String {
        let mut url = match &self.base_url {
            Some(url) => url.clone(),
            None => format!("https://{server}.api.mailchimp.com/3.0/"),
        };
        if !url.ends_with('/') {
            url.push('/');
        }
        url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_millis)
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Environment values that look like numbers get parsed as numbers, list ids can be all digits.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(u64),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail),
        }
    }
}

// ###################################
// ->   TESTS
// ###################################
