use poem_openapi::{payload::Json, ApiResponse, Object};
use serde::Deserialize;

use crate::schema::common::{BadRequestResponse, InternalServerErrorResponse};

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Object, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// seconds until the token expires
    pub exp_in: i32,
}

#[derive(ApiResponse)]
pub enum SignupResponses {
    #[oai(status = 201)]
    Created(Json<TokenResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum LoginResponses {
    #[oai(status = 200)]
    Ok(Json<TokenResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
