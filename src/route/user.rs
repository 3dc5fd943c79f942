use std::sync::Arc;

use chrono::Local;
use poem::web::Data;
use poem_openapi::{param::Path, payload::Json, types::multipart::Upload, OpenApi, Tags};

use crate::{
    core::{
        security::{get_user_from_token, BearerAuthorization},
        upload::{check_upload, save_upload, UploadKind},
        utils::{datetime_to_string_opt, is_email_shaped, is_valid_zip},
    },
    model::{address::Address, user::User},
    repository::user::{
        create_user_with_address, get_address_by_user_id, get_all_users, get_user_by_id,
        update_address, update_user,
    },
    schema::{
        common::{
            BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
            UnauthorizedResponse,
        },
        user::{
            DetailAddress, DetailUser, GetAllUserResponses, UserCreateResponse,
            UserCreateResponses, UserRecordForm, UserUpdateResponse, UserUpdateResponses,
        },
    },
    settings::get_config,
    AppState,
};

#[derive(Tags)]
enum ApiUserTags {
    User,
}

pub struct ApiUser;

enum StoredUpload {
    Path(Option<String>),
    Rejected(String),
    Failed(String),
}

/// Reads, classifies and stores one optional file field. The file is written
/// before the database insert, so a later failed insert leaves it behind.
async fn process_upload(kind: UploadKind, upload: Option<Upload>, upload_dir: &str) -> StoredUpload {
    let upload = match upload {
        Some(val) => val,
        None => return StoredUpload::Path(None),
    };
    let file_name = upload.file_name().map(|val| val.to_string());
    let content_type = upload.content_type().map(|val| val.to_string());
    let data = match upload.into_vec().await {
        Ok(val) => val,
        Err(err) => return StoredUpload::Failed(err.to_string()),
    };
    if let Err(rejection) = check_upload(
        kind,
        file_name.as_deref(),
        content_type.as_deref(),
        data.len(),
    ) {
        return StoredUpload::Rejected(rejection.message());
    }
    match save_upload(upload_dir, kind, file_name.as_deref(), &data).await {
        Ok(path) => StoredUpload::Path(Some(path)),
        Err(err) => StoredUpload::Failed(err.to_string()),
    }
}

fn validate_record_fields(form: &UserRecordForm) -> Option<String> {
    if form.first_name.trim().is_empty() || form.last_name.trim().is_empty() {
        return Some("firstName and lastName must not be empty".to_string());
    }
    if !is_email_shaped(&form.email) {
        return Some("Must be a valid email address".to_string());
    }
    if !is_valid_zip(&form.company_zip) {
        return Some("Company Zip must be exactly 6 characters".to_string());
    }
    if !is_valid_zip(&form.home_zip) {
        return Some("Home Zip must be exactly 6 characters".to_string());
    }
    None
}

#[OpenApi]
impl ApiUser {
    #[oai(path = "/users", method = "post", tag = "ApiUserTags::User")]
    async fn user_create_api(
        &self,
        form: UserRecordForm,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserCreateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_create_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let config = get_config();
        let jwt_token = auth.0.token;
        let request_user = match get_user_from_token(&mut tx, jwt_token, config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_create_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if request_user.is_none() {
            return UserCreateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // validate form fields
        if let Some(message) = validate_record_fields(&form) {
            return UserCreateResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // store uploads
        let profile_pic =
            match process_upload(UploadKind::ProfilePhoto, form.profile_photo, &config.upload_dir)
                .await
            {
                StoredUpload::Path(val) => val,
                StoredUpload::Rejected(message) => {
                    return UserCreateResponses::BadRequest(Json(BadRequestResponse { message }));
                }
                StoredUpload::Failed(err) => {
                    return UserCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "user_create_api",
                            "store profile photo",
                            &err,
                        ),
                    ));
                }
            };
        let appointment_letter = match process_upload(
            UploadKind::AppointmentLetter,
            form.appointment_letter,
            &config.upload_dir,
        )
        .await
        {
            StoredUpload::Path(val) => val,
            StoredUpload::Rejected(message) => {
                return UserCreateResponses::BadRequest(Json(BadRequestResponse { message }));
            }
            StoredUpload::Failed(err) => {
                return UserCreateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_create_api",
                        "store appointment letter",
                        &err,
                    ),
                ));
            }
        };

        // Insert User and Address in one transaction
        let now = Local::now().fixed_offset();
        let new_user = User {
            id: 0,
            first_name: form.first_name,
            last_name: form.last_name,
            email: form.email,
            // record-path identities carry no credential
            password: None,
            profile_pic,
            appointment_letter,
            created_date: Some(now),
            updated_date: Some(now),
        };
        let new_address = Address {
            id: 0,
            user_id: 0,
            company_address: form.company_address,
            company_city: form.company_city,
            company_state: form.company_state,
            company_zip: form.company_zip,
            home_address: form.home_address,
            home_city: form.home_city,
            home_state: form.home_state,
            home_zip: form.home_zip,
            created_date: Some(now),
            updated_date: Some(now),
        };
        let (created_user, _) =
            match create_user_with_address(&mut tx, &new_user, &new_address).await {
                Ok(val) => val,
                Err(err) => {
                    return UserCreateResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "user_create_api",
                            "create_user_with_address",
                            &err.to_string(),
                        ),
                    ));
                }
            };

        if let Err(err) = tx.commit().await {
            return UserCreateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "user_create_api",
                    "commit to database",
                    &err.to_string(),
                ),
            ));
        }

        UserCreateResponses::Created(Json(UserCreateResponse {
            id: created_user.id,
            message: "User added successfully".to_string(),
        }))
    }

    #[oai(path = "/users", method = "get", tag = "ApiUserTags::User")]
    async fn get_all_users_api(
        &self,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> GetAllUserResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return GetAllUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_all_users_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let config = get_config();
        let jwt_token = auth.0.token;
        let request_user = match get_user_from_token(&mut tx, jwt_token, config).await {
            Ok(val) => val,
            Err(err) => {
                return GetAllUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_all_users_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if request_user.is_none() {
            return GetAllUserResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        let data = match get_all_users(&mut tx).await {
            Ok(val) => val,
            Err(err) => {
                return GetAllUserResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "get_all_users_api",
                        "get_all_users",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Address may be absent for signup-only identities.
        let mut results: Vec<DetailUser> = vec![];
        for item in data {
            let address = match get_address_by_user_id(&mut tx, item.id).await {
                Ok(val) => val,
                Err(err) => {
                    return GetAllUserResponses::InternalServerError(Json(
                        InternalServerErrorResponse::new(
                            "route.user",
                            "get_all_users_api",
                            "get_address_by_user_id",
                            &err.to_string(),
                        ),
                    ));
                }
            };
            results.push(DetailUser {
                id: item.id,
                first_name: item.first_name,
                last_name: item.last_name,
                email: item.email,
                profile_pic: item.profile_pic,
                appointment_letter: item.appointment_letter,
                created_date: datetime_to_string_opt(item.created_date),
                updated_date: datetime_to_string_opt(item.updated_date),
                address: address.map(|x| DetailAddress {
                    company_address: x.company_address,
                    company_city: x.company_city,
                    company_state: x.company_state,
                    company_zip: x.company_zip,
                    home_address: x.home_address,
                    home_city: x.home_city,
                    home_state: x.home_state,
                    home_zip: x.home_zip,
                }),
            });
        }

        GetAllUserResponses::Ok(Json(results))
    }

    #[oai(path = "/users/:id", method = "put", tag = "ApiUserTags::User")]
    async fn user_update_api(
        &self,
        Path(id): Path<i32>,
        form: UserRecordForm,
        state: Data<&Arc<AppState>>,
        auth: BearerAuthorization,
    ) -> UserUpdateResponses {
        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        // Validate user token
        let config = get_config();
        let jwt_token = auth.0.token;
        let request_user = match get_user_from_token(&mut tx, jwt_token, config.clone()).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "get user from token",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if request_user.is_none() {
            return UserUpdateResponses::Unauthorized(Json(UnauthorizedResponse::default()));
        }

        // Both the user and its address must already exist.
        let user = match get_user_by_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "get_user_by_id",
                        &err.to_string(),
                    ),
                ));
            }
        };
        let address = match get_address_by_user_id(&mut tx, id).await {
            Ok(val) => val,
            Err(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "get_address_by_user_id",
                        &err.to_string(),
                    ),
                ));
            }
        };
        if user.is_none() || address.is_none() {
            return UserUpdateResponses::NotFound(Json(NotFoundResponse {
                message: "User not found".to_string(),
            }));
        }

        // validate form fields
        if let Some(message) = validate_record_fields(&form) {
            return UserUpdateResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // store uploads; omitted file fields keep the stored path
        let mut user = user.unwrap();
        let mut address = address.unwrap();
        match process_upload(UploadKind::ProfilePhoto, form.profile_photo, &config.upload_dir)
            .await
        {
            StoredUpload::Path(Some(path)) => user.profile_pic = Some(path),
            StoredUpload::Path(None) => {}
            StoredUpload::Rejected(message) => {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse { message }));
            }
            StoredUpload::Failed(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "store profile photo",
                        &err,
                    ),
                ));
            }
        }
        match process_upload(
            UploadKind::AppointmentLetter,
            form.appointment_letter,
            &config.upload_dir,
        )
        .await
        {
            StoredUpload::Path(Some(path)) => user.appointment_letter = Some(path),
            StoredUpload::Path(None) => {}
            StoredUpload::Rejected(message) => {
                return UserUpdateResponses::BadRequest(Json(BadRequestResponse { message }));
            }
            StoredUpload::Failed(err) => {
                return UserUpdateResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.user",
                        "user_update_api",
                        "store appointment letter",
                        &err,
                    ),
                ));
            }
        }

        // Update user and address
        let now = Local::now().fixed_offset();
        user.first_name = form.first_name;
        user.last_name = form.last_name;
        user.email = form.email;
        address.company_address = form.company_address;
        address.company_city = form.company_city;
        address.company_state = form.company_state;
        address.company_zip = form.company_zip;
        address.home_address = form.home_address;
        address.home_city = form.home_city;
        address.home_state = form.home_state;
        address.home_zip = form.home_zip;
        if let Err(err) = update_user(&mut tx, &mut user, &now).await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "user_update_api",
                    "update_user",
                    &err.to_string(),
                ),
            ));
        }
        if let Err(err) = update_address(&mut tx, &mut address, &now).await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "user_update_api",
                    "update_address",
                    &err.to_string(),
                ),
            ));
        }

        if let Err(err) = tx.commit().await {
            return UserUpdateResponses::InternalServerError(Json(
                InternalServerErrorResponse::new(
                    "route.user",
                    "user_update_api",
                    "commit to database",
                    &err.to_string(),
                ),
            ));
        }

        UserUpdateResponses::Ok(Json(UserUpdateResponse {
            message: "User updated successfully".to_string(),
        }))
    }
}
