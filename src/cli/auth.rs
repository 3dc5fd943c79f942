use chrono::Local;
use sqlx::PgPool;

use crate::{
    core::security::hash_password,
    model::user::User,
    repository::user::{create_credential, get_user_by_email},
};

pub async fn create_account(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<User> {
    let mut tx = pool.begin().await?;

    if get_user_by_email(&mut tx, email).await?.is_some() {
        anyhow::bail!("email {} already exists", email);
    }

    let hashed_password =
        hash_password(password).map_err(|err| anyhow::anyhow!("hash password: {err}"))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: 0,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        password: Some(hashed_password),
        profile_pic: None,
        appointment_letter: None,
        created_date: Some(now),
        updated_date: Some(now),
    };
    let user = create_credential(&mut tx, &user).await?;
    tx.commit().await?;
    Ok(user)
}
