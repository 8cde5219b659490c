//! API error mapping
//!
//! Every failure surfaces as an HTTP status plus a JSON `{ "message": ... }`
//! body. Filesystem failures become 500s with the underlying message in an
//! `error` field; nothing is retried server-side.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use aperture_core::{AuthError, GalleryError};

pub enum ApiError {
    Auth(AuthError),
    Gallery {
        context: &'static str,
        source: GalleryError,
    },
    /// Multipart request without an `image` field
    MissingImageField,
    /// Malformed multipart payload
    BadUpload(String),
}

impl ApiError {
    /// Wrap a gallery failure with the route-specific 500 message.
    pub fn gallery(context: &'static str) -> impl FnOnce(GalleryError) -> ApiError {
        move |source| ApiError::Gallery { context, source }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Auth(e) => {
                let status = match e {
                    AuthError::InvalidCredentials | AuthError::MissingToken => {
                        StatusCode::UNAUTHORIZED
                    }
                    AuthError::InvalidToken => StatusCode::FORBIDDEN,
                };
                (status, json!({ "message": e.to_string() }))
            }

            ApiError::Gallery { context, source } => match source {
                GalleryError::UnsupportedType => (
                    StatusCode::BAD_REQUEST,
                    json!({ "message": "Images only (jpeg, jpg, png, gif)." }),
                ),
                GalleryError::PayloadTooLarge(limit) => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    json!({ "message": format!("Image too large (limit {limit} bytes).") }),
                ),
                GalleryError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    json!({ "message": "Image not found." }),
                ),
                GalleryError::Io(e) => {
                    tracing::error!("{}: {}", context, e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": context, "error": e.to_string() }),
                    )
                }
            },

            ApiError::MissingImageField => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "No image file provided." }),
            ),

            ApiError::BadUpload(detail) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": format!("Upload Error: {detail}") }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
