use poem_openapi::Object;
use serde::Deserialize;
use tracing::error;

#[derive(Object, Deserialize)]
pub struct BadRequestResponse {
    pub message: String,
}

#[derive(Object, Deserialize)]
pub struct UnauthorizedResponse {
    pub message: String,
}

impl Default for UnauthorizedResponse {
    fn default() -> Self {
        Self {
            message: "Unauthorized".to_string(),
        }
    }
}

#[derive(Object, Deserialize)]
pub struct NotFoundResponse {
    pub message: String,
}

/// The failure detail goes to the log; the client only ever sees an opaque
/// message.
#[derive(Object, Deserialize)]
pub struct InternalServerErrorResponse {
    pub message: String,
}

impl InternalServerErrorResponse {
    pub fn new(module: &str, function: &str, step: &str, err: &str) -> Self {
        error!("{}::{} failed on {}: {}", module, function, step, err);
        Self {
            message: "Internal server error".to_string(),
        }
    }
}
