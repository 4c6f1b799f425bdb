//! Request input extraction: JSON or form bodies and query strings.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};
use catfarm_core::validate::{RawInput, ValidationError};

use super::error::ApiError;

/// Request body decoded into a [`RawInput`].
///
/// `application/json` bodies must hold an object; anything else is read as
/// `application/x-www-form-urlencoded`. An empty body is an empty input.
pub struct Payload(pub RawInput);

/// A body that could not be decoded. Handlers that prefix their own message
/// take `Result<Payload, PayloadRejection>` and unwrap the error themselves.
#[derive(Debug)]
pub struct PayloadRejection(pub ValidationError);

impl From<PayloadRejection> for ApiError {
    fn from(rejection: PayloadRejection) -> Self {
        ApiError::Validation(format!("Bad Request - {}", rejection.0))
    }
}

impl IntoResponse for PayloadRejection {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = PayloadRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(is_json_content_type)
            .unwrap_or(false);

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| reject(ValidationError::Malformed(rejection.body_text())))?;

        parse_body(&body, is_json).map(Payload).map_err(reject)
    }
}

fn reject(err: ValidationError) -> PayloadRejection {
    tracing::info!("Request body rejected - {}", err);
    PayloadRejection(err)
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}

pub fn parse_body(body: &[u8], is_json: bool) -> Result<RawInput, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawInput::default());
    }

    if is_json {
        let value = serde_json::from_slice(body)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        RawInput::from_json(value)
    } else {
        Ok(parse_query(body))
    }
}

/// Decode a query string or form body.
pub fn parse_query(query: &[u8]) -> RawInput {
    RawInput::from_pairs(url::form_urlencoded::parse(query).into_owned())
}
