use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::Value;
use tracing::{info, Span};

use crate::{
    mailchimp::{self, BatchResponse, MembersBatch},
    web::{
        types::{SignupForm, SubscribeResult, ValidSignup},
        WebResult,
    },
    AppState,
};

/// Used when the provider fails or rejects a member without saying why.
const PROVIDER_FALLBACK_MSG: &str = "MailChimp request failed";

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("mailchimp rejected the member: {message}")]
    MemberRejected {
        message: String,
        code: Option<String>,
    },
    #[error("mailchimp rejected the request with status {status}: {message}")]
    ProviderRejected {
        status: StatusCode,
        message: String,
        code: Option<Value>,
    },
    #[error("mailchimp reported {0} member errors without describing any")]
    UndescribedMemberErrors(u32),

    #[error("mailchimp client error: {0}")]
    ListClient(#[from] mailchimp::Error),
}

// ###################################
// ->   API
// ###################################
pub async fn signup_get() -> Json<SubscribeResult> {
    Json(SubscribeResult::ready())
}

#[tracing::instrument(
    name = "Adding a new subscriber to the mailing list",
    skip(app_state, body),
    fields(subscriber_email = tracing::field::Empty)
)]
pub async fn signup_post(
    State(app_state): State<AppState>,
    body: Result<Json<SignupForm>, JsonRejection>,
) -> WebResult<Json<SubscribeResult>> {
    let form = match body {
        Ok(Json(form)) => form,
        // Nothing to read the fields from, validation reports them as missing.
        Err(JsonRejection::MissingJsonContentType(_)) | Err(JsonRejection::JsonDataError(_)) => {
            SignupForm::default()
        }
        Err(rejection) => return Err(rejection.into()),
    };

    let signup = ValidSignup::try_from(form)?;
    Span::current().record("subscriber_email", signup.email.as_ref());

    let batch = MembersBatch::single_subscriber(
        signup.email.as_ref(),
        signup.fname.as_ref(),
        signup.lname.as_ref(),
    );
    let outcome = app_state.list_client.batch_list_members(&batch).await;

    let result = subscribe_result(&signup, outcome).inspect_err(|er| {
        tracing::error!(error = %er, "MailChimp Error");
    })?;
    info!("SUCCESS");

    Ok(Json(result))
}

// ###################################
// ->   HELPERS
// ###################################

/// Translates the outcome of the provider call into the response for the client.
fn subscribe_result(
    signup: &ValidSignup,
    outcome: mailchimp::Result<BatchResponse>,
) -> Result<SubscribeResult, SubscribeError> {
    let resp = match outcome {
        Ok(resp) => resp,
        Err(mailchimp::Error::Api { status, body }) => {
            let status = status
                .or_else(|| {
                    body.status
                        .as_ref()
                        .and_then(Value::as_u64)
                        .and_then(|st| u16::try_from(st).ok())
                        .and_then(|st| StatusCode::from_u16(st).ok())
                })
                .unwrap_or(StatusCode::BAD_REQUEST);

            return Err(SubscribeError::ProviderRejected {
                status,
                message: or_fallback_msg(body.detail),
                code: body.status,
            });
        }
        Err(er) => return Err(er.into()),
    };

    if resp.error_count > 0 {
        let first = resp
            .errors
            .into_iter()
            .next()
            .ok_or(SubscribeError::UndescribedMemberErrors(resp.error_count))?;
        return Err(SubscribeError::MemberRejected {
            message: or_fallback_msg(first.error),
            code: first.error_code,
        });
    }

    Ok(SubscribeResult::subscribed(signup))
}

fn or_fallback_msg(message: Option<String>) -> String {
    message
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| PROVIDER_FALLBACK_MSG.to_string())
}
