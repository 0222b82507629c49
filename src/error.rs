use crate::lemlist::UpstreamError;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use serde::Serialize;
use std::io::Cursor;

#[derive(Debug)]
pub enum ApiError {
    /// The service itself is misconfigured (missing credential).
    Configuration(String),
    /// The upstream failed; `status` is what this API answers with.
    Upstream { status: Status, message: String },
    InternalError(String),
}

impl ApiError {
    /// Upstream failure while building an aggregate view. Always a 500, with
    /// the upstream status and body folded into the message.
    pub fn aggregate(context: &str, err: UpstreamError) -> Self {
        match err {
            UpstreamError::Configuration => ApiError::configuration(),
            err => ApiError::Upstream {
                status: Status::InternalServerError,
                message: format!("Error {context}: {err}"),
            },
        }
    }

    /// Upstream failure of a forwarded action. Upstream 4xx/5xx statuses are
    /// passed through to the caller.
    pub fn passthrough(context: &str, err: UpstreamError) -> Self {
        let status = err
            .status()
            .and_then(|status| Status::from_code(status.as_u16()))
            .unwrap_or(Status::InternalServerError);
        match err {
            UpstreamError::Configuration => ApiError::configuration(),
            err => ApiError::Upstream {
                status,
                message: format!("Error {context}: {err}"),
            },
        }
    }

    pub fn configuration() -> Self {
        ApiError::Configuration("LEMLIST_API_KEY not configured".to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, error_type, message) = match self {
            ApiError::Configuration(msg) => {
                log::error!("configuration error: {}", msg);
                (Status::InternalServerError, "ConfigurationError", msg)
            }
            ApiError::Upstream { status, message } => {
                log::warn!("upstream error ({}): {}", status.code, message);
                (status, "UpstreamError", message)
            }
            ApiError::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                (Status::InternalServerError, "InternalError", msg)
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        let json = serde_json::to_string(&error_response)
            .unwrap_or_else(|_| r#"{"error":"SerializationError","message":"Failed to serialize error"}"#.to_string());

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        Ok(Responses::default())
    }
}
