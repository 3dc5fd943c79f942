use chrono::Local;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

use crate::core::security::{generate_token_from_user, hash_password};
use crate::model::user::User;
use crate::settings::Config;

pub struct TestUser {
    pub user: User,
    pub token: String,
}

/// Inserts a credential-only user and issues a token for it, the way signup
/// would.
pub async fn generate_test_user(
    db: &mut PoolConnection<Postgres>,
    config: Config,
    email: &str,
    password: &str,
) -> anyhow::Result<TestUser> {
    let hashed_password = hash_password(password).unwrap();
    let now = Local::now().fixed_offset();
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO public.users (first_name, last_name, email, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind("Test")
    .bind("User")
    .bind(email)
    .bind(&hashed_password)
    .bind(now)
    .bind(now)
    .fetch_one(&mut **db)
    .await?;

    let token = generate_token_from_user(&user, config).await?;

    Ok(TestUser { user, token })
}

#[cfg(test)]
mod tests {
    use sqlx::{Acquire, PgPool};

    use crate::{
        core::{security::get_user_from_token, test_utils::generate_test_user},
        settings::get_config,
    };

    #[sqlx::test]
    async fn test_generate_test_user(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let config = get_config();

        // When
        let mut db = pool.acquire().await?;
        let res = generate_test_user(
            &mut db,
            config.clone(),
            "testuser@example.com",
            "testpassword",
        )
        .await?;

        // Expect
        // is user exists on db
        let user: Option<(i32, String)> =
            sqlx::query_as("SELECT id, email FROM public.users WHERE id = $1")
                .bind(res.user.id)
                .fetch_optional(&mut *db)
                .await?;
        assert!(user.is_some());
        assert_eq!(user.unwrap().1, "testuser@example.com".to_string());

        // is jwt token valid
        let mut tx = db.begin().await?;
        let user_token = get_user_from_token(&mut tx, Some(res.token.clone()), config).await?;
        assert!(user_token.is_some());
        assert_eq!(user_token.unwrap().id, res.user.id);
        Ok(())
    }
}
