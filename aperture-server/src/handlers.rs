//! HTTP handlers for the portfolio API

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use aperture_core::AuthError;

use crate::error::ApiError;
use crate::state::AppState;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "aperture-server"
    }))
}

/// Login request body
#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

/// Login response
#[derive(Serialize)]
pub struct LoginResponse {
    message: &'static str,
    token: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = state.auth.login(&req.username, &req.password)?;
    Ok(Json(LoginResponse {
        message: "Login successful!",
        token,
    }))
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = authorized_token(&state, &headers)?;
    state.auth.logout(&token);
    Ok(Json(serde_json::json!({
        "message": "Logged out successfully."
    })))
}

/// GET /api/images — public listing of the gallery directory
pub async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let images = state
        .gallery
        .list()
        .await
        .map_err(ApiError::gallery("Failed to retrieve images"))?;
    Ok(Json(images))
}

/// Upload response
#[derive(Serialize)]
pub struct UploadResponse {
    message: &'static str,
    filename: String,
    filepath: String,
}

/// POST /api/upload — multipart form with an `image` file field
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    authorized_token(&state, &headers)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() == Some("image") {
            let original_name = field.file_name().unwrap_or_default().to_string();
            let media_type = field.content_type().map(str::to_string);
            let content = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadUpload(e.to_string()))?;
            upload = Some((original_name, media_type, content));
            break;
        }
    }
    let (original_name, media_type, content) = upload.ok_or(ApiError::MissingImageField)?;

    let filename = state
        .gallery
        .save(&content, &original_name, media_type.as_deref())
        .await
        .map_err(ApiError::gallery("Failed to store image"))?;

    let filepath = format!("/images/gallery/{filename}");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Image uploaded successfully!",
            filename,
            filepath,
        }),
    ))
}

/// DELETE /api/images/{filename}
pub async fn delete_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(filename): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorized_token(&state, &headers)?;

    state
        .gallery
        .delete(&filename)
        .await
        .map_err(ApiError::gallery("Failed to delete image"))?;

    Ok(Json(serde_json::json!({
        "message": format!("Image '{filename}' deleted successfully.")
    })))
}

/// Check the bearer token on a protected route and hand it back.
fn authorized_token(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let Some(token) = extract_bearer_token(headers) else {
        return Err(AuthError::MissingToken.into());
    };
    state.auth.authorize(Some(&token))?;
    Ok(token)
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
