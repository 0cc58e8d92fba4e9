use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::AsRefStr;

/// Mailchimp accepts any username for basic auth, only the API key matters.
const BASIC_AUTH_USER: &str = "anystring";

// ###################################
// ->   TRAIT
// ###################################
/// A mailing list provider that can add members to a list in one batch.
#[async_trait]
pub trait ListClient: Send + Sync {
    async fn batch_list_members(&self, batch: &MembersBatch) -> Result<BatchResponse>;
}

// ###################################
// ->   CLIENT
// ###################################
#[derive(Debug)]
pub struct MailchimpClient {
    pub http_client: Client,
    pub url: reqwest::Url,
    pub list_id: String,
    api_key: SecretString,
}

impl MailchimpClient {
    /// `base_url` is the API root, e.g. `https://us21.api.mailchimp.com/3.0/`.
    pub fn new<S: AsRef<str>>(
        base_url: S,
        list_id: String,
        api_key: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(base_url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(MailchimpClient {
            http_client,
            url,
            list_id,
            api_key,
        })
    }

    fn list_url(&self) -> Result<reqwest::Url> {
        self.url
            .join(&format!("lists/{}", self.list_id))
            .map_err(|e| Error::UrlParsing(e.to_string()))
    }
}

#[async_trait]
impl ListClient for MailchimpClient {
    #[tracing::instrument(name = "Batch adding members to a Mailchimp list", skip_all, fields(list_id = %self.list_id, members = batch.members.len()))]
    async fn batch_list_members(&self, batch: &MembersBatch) -> Result<BatchResponse> {
        let resp = self
            .http_client
            .post(self.list_url()?)
            .basic_auth(BASIC_AUTH_USER, Some(self.api_key.expose_secret()))
            .json(batch)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            // Mailchimp answers errors with a problem document, anything else gets an empty one.
            let problem = serde_json::from_slice(&body).unwrap_or_default();
            return Err(Error::Api {
                status: Some(status),
                body: problem,
            });
        }

        let batch_resp: BatchResponse = serde_json::from_slice(&body)?;
        tracing::debug!(
            error_count = batch_resp.error_count,
            total_created = batch_resp.total_created,
            total_updated = batch_resp.total_updated,
        );

        Ok(batch_resp)
    }
}

// ###################################
// ->   REQUEST
// ###################################
#[derive(Debug, Serialize)]
pub struct MembersBatch {
    pub members: Vec<NewMember>,
    pub update_existing: bool,
}

impl MembersBatch {
    /// A batch containing a single member that is subscribed right away.
    pub fn single_subscriber(email: &str, first_name: &str, last_name: &str) -> Self {
        MembersBatch {
            members: vec![NewMember {
                email_address: email.to_string(),
                status: MemberStatus::Subscribed,
                merge_fields: MergeFields {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                },
            }],
            update_existing: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NewMember {
    pub email_address: String,
    pub status: MemberStatus,
    pub merge_fields: MergeFields,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Subscribed,
}

#[derive(Debug, Serialize)]
pub struct MergeFields {
    #[serde(rename = "FNAME")]
    pub first_name: String,
    #[serde(rename = "LNAME")]
    pub last_name: String,
}

// ###################################
// ->   RESPONSE
// ###################################
#[derive(Debug, Default, Deserialize)]
pub struct BatchResponse {
    #[serde(default)]
    pub error_count: u32,
    #[serde(default)]
    pub errors: Vec<MemberError>,
    #[serde(default)]
    pub total_created: u32,
    #[serde(default)]
    pub total_updated: u32,
}

/// A per-member error from a batch operation.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberError {
    pub email_address: Option<String>,
    pub error: Option<String>,
    pub error_code: Option<String>,
}

/// The JSON error document Mailchimp sends with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    /// Usually the HTTP status as a number, kept as received.
    pub status: Option<Value>,
    pub detail: Option<String>,
    pub instance: Option<String>,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("mailchimp responded with an error (status: {status:?}): {body:?}")]
    Api {
        status: Option<StatusCode>,
        body: ProblemDetail,
    },
    #[error("url parsing error: {0}")]
    UrlParsing(String),

    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("deserializing mailchimp response: {0}")]
    Deserialize(#[from] serde_json::Error),
}
