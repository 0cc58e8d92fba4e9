use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::{routes::SubscribeError, types::DataParsingError, types::SubscribeResult};

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("invalid signup input: {0}")]
    InvalidInput(#[from] DataParsingError),
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    #[error("request body rejected: {0}")]
    BodyRejection(#[from] JsonRejection),
    #[error("unexpected error: {0}")]
    Unexpected(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::InvalidInput(data_er) => (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string())),
            Error::Subscribe(SubscribeError::MemberRejected { message, code }) => (
                StatusCode::BAD_REQUEST,
                MemberRejected {
                    message: message.clone(),
                    code: code.clone(),
                },
            ),
            Error::Subscribe(SubscribeError::ProviderRejected {
                status,
                message,
                code,
            }) => (
                *status,
                ProviderRejected {
                    message: message.clone(),
                    code: code.clone(),
                },
            ),
            Error::Subscribe(_) => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
            Error::BodyRejection(_) | Error::Unexpected(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, InternalError)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the client gets to see of an error.
#[derive(Debug, Clone, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("{_0}")]
    InvalidInput(String),
    #[display("{message}")]
    MemberRejected {
        message: String,
        code: Option<String>,
    },
    #[display("{message}")]
    ProviderRejected { message: String, code: Option<Value> },
    #[display("An unexpected error occurred while processing your request")]
    ServiceError,
    #[display("An unexpected error occurred")]
    InternalError,
}

impl ClientError {
    pub const INTERNAL_SERVER_ERROR_CODE: &'static str = "INTERNAL_SERVER_ERROR";

    /// Renders the normalized response body for this error.
    pub fn to_result(&self) -> SubscribeResult {
        use ClientError::*;

        let code = match self {
            InvalidInput(_) => None,
            MemberRejected { code, .. } => code.clone().map(Value::String),
            ProviderRejected { code, .. } => code.clone(),
            ServiceError | InternalError => {
                Some(Value::String(Self::INTERNAL_SERVER_ERROR_CODE.to_string()))
            }
        };

        SubscribeResult::failure(self.to_string(), code)
    }
}
