use poem_openapi::{payload::Json, types::multipart::Upload, ApiResponse, Multipart, Object};
use serde::Deserialize;

use super::common::{
    BadRequestResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
};

/// Shared multipart form for create and edit. Field names follow the wire
/// format the frontend posts (camelCase, one optional file per category).
#[derive(Debug, Multipart)]
#[oai(rename_all = "camelCase")]
pub struct UserRecordForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub company_address: String,
    pub company_city: String,
    pub company_state: String,
    pub company_zip: String,
    pub home_address: String,
    pub home_city: String,
    pub home_state: String,
    pub home_zip: String,
    pub profile_photo: Option<Upload>,
    pub appointment_letter: Option<Upload>,
}

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct DetailAddress {
    pub company_address: String,
    pub company_city: String,
    pub company_state: String,
    pub company_zip: String,
    pub home_address: String,
    pub home_city: String,
    pub home_state: String,
    pub home_zip: String,
}

#[derive(Object, Deserialize)]
#[oai(rename_all = "camelCase")]
pub struct DetailUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub appointment_letter: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub address: Option<DetailAddress>,
}

#[derive(Object, Deserialize)]
pub struct UserCreateResponse {
    pub id: i32,
    pub message: String,
}

#[derive(ApiResponse)]
pub enum UserCreateResponses {
    #[oai(status = 201)]
    Created(Json<UserCreateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(ApiResponse)]
pub enum GetAllUserResponses {
    #[oai(status = 200)]
    Ok(Json<Vec<DetailUser>>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}

#[derive(Object, Deserialize)]
pub struct UserUpdateResponse {
    pub message: String,
}

#[derive(ApiResponse)]
pub enum UserUpdateResponses {
    #[oai(status = 200)]
    Ok(Json<UserUpdateResponse>),

    #[oai(status = 400)]
    BadRequest(Json<BadRequestResponse>),

    #[oai(status = 401)]
    Unauthorized(Json<UnauthorizedResponse>),

    #[oai(status = 404)]
    NotFound(Json<NotFoundResponse>),

    #[oai(status = 500)]
    InternalServerError(Json<InternalServerErrorResponse>),
}
