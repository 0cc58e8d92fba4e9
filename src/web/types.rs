//! Most of the structs in `web` module and their implementations live here.
//! Includes structs that need to be validated, their parsing implementations and tests for those

use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable signup form.
/// Only a JSON object is accepted, anything else is rejected by the extractor.
/// Every field is optional here, falsy JSON values (`null`, `false`, `0`, `""`) end up as `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct SignupForm {
    pub email: Option<String>,
    pub fname: Option<String>,
    pub lname: Option<String>,
}

impl From<Map<String, Value>> for SignupForm {
    fn from(fields: Map<String, Value>) -> Self {
        Self {
            email: truthy_string(fields.get("email")),
            fname: truthy_string(fields.get("fname")),
            lname: truthy_string(fields.get("lname")),
        }
    }
}

impl SignupForm {
    pub fn new(email: &str, fname: &str, lname: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            fname: Some(fname.to_string()),
            lname: Some(lname.to_string()),
        }
    }
}

/// Validated signup
/// A signup with all the fields validated
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub email: ValidEmail,
    pub fname: SubscriberName,
    pub lname: SubscriberName,
}

impl TryFrom<SignupForm> for ValidSignup {
    type Error = DataParsingError;

    /// All fields are checked for presence before the email format is looked at.
    fn try_from(form: SignupForm) -> Result<Self, Self::Error> {
        let (Some(email), Some(fname), Some(lname)) = (form.email, form.fname, form.lname) else {
            return Err(DataParsingError::MissingFields);
        };

        Ok(ValidSignup {
            fname: SubscriberName::parse(fname)?,
            lname: SubscriberName::parse(lname)?,
            email: ValidEmail::parse(email)?,
        })
    }
}

/// Validated Subscriber Email
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.is_empty() {
            return Err(DataParsingError::MissingFields);
        }

        if regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", value) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }
}

/// Validated Subscriber Name
/// Only has to be non-empty, whitespace is kept as sent.
#[derive(Debug, Clone)]
pub struct SubscriberName(String);

impl AsRef<str> for SubscriberName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SubscriberName {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(DataParsingError::MissingFields);
        }

        Ok(SubscriberName(value.to_owned()))
    }
}

/// The normalized JSON body of every `/signup` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribeResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SignupData>,
    /// A provider or service error code, either a string or the provider's numeric status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
}

impl SubscribeResult {
    pub const READY_MSG: &'static str = "Signup endpoint ready to receive POST requests";
    pub const SUBSCRIBED_MSG: &'static str = "Successfully subscribed to the newsletter";

    pub fn ready() -> Self {
        Self {
            success: true,
            message: Self::READY_MSG.to_string(),
            data: None,
            code: None,
        }
    }

    pub fn subscribed(signup: &ValidSignup) -> Self {
        Self {
            success: true,
            message: Self::SUBSCRIBED_MSG.to_string(),
            data: Some(SignupData::from(signup)),
            code: None,
        }
    }

    pub fn failure(message: impl Into<String>, code: Option<Value>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            code,
        }
    }
}

/// The subscriber data echoed back on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&ValidSignup> for SignupData {
    fn from(signup: &ValidSignup) -> Self {
        Self {
            email: signup.email.as_ref().to_string(),
            first_name: signup.fname.as_ref().to_string(),
            last_name: signup.lname.as_ref().to_string(),
        }
    }
}

// ###################################
// ->   HELPERS
// ###################################
/// Reads a JSON value the way a truthiness check would:
/// falsy values become `None`, other scalars are stringified, strings are kept as they are.
fn truthy_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        other => Some(other.to_string()),
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("Missing required fields: email, fname, and lname are required")]
    MissingFields,
    #[error("Invalid email format")]
    EmailInvalid,
}
