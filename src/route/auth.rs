use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::{
        security::{generate_token_from_user, hash_password, verify_hash_password},
        utils::is_email_shaped,
    },
    model::user::User,
    repository::user::{create_credential, get_user_by_email},
    schema::{
        auth::{LoginRequest, LoginResponses, SignupRequest, SignupResponses, TokenResponse},
        common::{BadRequestResponse, InternalServerErrorResponse},
    },
    settings::get_config,
    AppState,
};

#[derive(Tags)]
enum ApiAuthTags {
    Auth,
}

pub struct ApiAuth;

#[OpenApi]
impl ApiAuth {
    #[oai(path = "/signup", method = "post", tag = "ApiAuthTags::Auth")]
    async fn signup(
        &self,
        json: Json<SignupRequest>,
        state: Data<&Arc<AppState>>,
    ) -> SignupResponses {
        // validate json request
        if json.first_name.trim().is_empty() || json.last_name.trim().is_empty() {
            return SignupResponses::BadRequest(Json(BadRequestResponse {
                message: "firstName and lastName must not be empty".to_string(),
            }));
        }
        if !is_email_shaped(&json.email) {
            return SignupResponses::BadRequest(Json(BadRequestResponse {
                message: "Must be a valid email address".to_string(),
            }));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "signup",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // duplicate email check by prior lookup
        let existing = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "signup",
                        "check email on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if existing.is_some() {
            return SignupResponses::BadRequest(Json(BadRequestResponse {
                message: "Email already exists".to_string(),
            }));
        }

        let hashed_password = match hash_password(&json.password) {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "signup",
                        "hash_password",
                        &err.to_string(),
                    ),
                ));
            }
        };

        let now = Local::now().fixed_offset();
        let new_user = User {
            id: 0,
            first_name: json.first_name.clone(),
            last_name: json.last_name.clone(),
            email: json.email.clone(),
            password: Some(hashed_password),
            profile_pic: None,
            appointment_letter: None,
            created_date: Some(now),
            updated_date: Some(now),
        };
        let new_user = match create_credential(&mut tx, &new_user).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "signup",
                        "create_credential",
                        &err.to_string(),
                    ),
                ));
            }
        };

        if let Err(err) = tx.commit().await {
            return SignupResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.auth",
                "signup",
                "commit to database",
                &err.to_string(),
            )));
        }

        let config = get_config();
        let token = match generate_token_from_user(&new_user, config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return SignupResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "signup",
                        "generate token",
                        &err.to_string(),
                    ),
                ));
            }
        };

        SignupResponses::Created(Json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            exp_in: config.jwt_exp as i32 * 60,
        }))
    }

    #[oai(path = "/login", method = "post", tag = "ApiAuthTags::Auth")]
    async fn login(&self, json: Json<LoginRequest>, state: Data<&Arc<AppState>>) -> LoginResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "login",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // get email on db
        let user = match get_user_by_email(&mut tx, &json.email).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "login",
                        "check user on database",
                        &err.to_string(),
                    ),
                ));
            }
        };
        // One message for unknown email, credential-less row or bad password,
        // so callers cannot enumerate accounts.
        if user.is_none() {
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid Credentials".to_string(),
            }));
        }
        let user = user.unwrap();
        if user.password.is_none() {
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid Credentials".to_string(),
            }));
        }

        // validate user password
        let is_valid = match verify_hash_password(&json.password, user.password.as_ref().unwrap()) {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "login",
                        "validate user password",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if !is_valid {
            return LoginResponses::BadRequest(Json(BadRequestResponse {
                message: "Invalid Credentials".to_string(),
            }));
        }

        let config = get_config();
        let token = match generate_token_from_user(&user, config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return LoginResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.auth",
                        "login",
                        "generate token",
                        &err.to_string(),
                    ),
                ));
            }
        };

        LoginResponses::Ok(Json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            exp_in: config.jwt_exp as i32 * 60,
        }))
    }
}
