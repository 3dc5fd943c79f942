use chrono::{DateTime, FixedOffset};
use sqlx::{Postgres, Transaction};

use crate::model::{
    address::{Address, TABLE_NAME as ADDRESS_TABLE_NAME},
    user::{User, TABLE_NAME},
};

pub async fn get_all_users(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<Vec<User>> {
    Ok(
        sqlx::query_as(format!("SELECT * FROM {} ORDER BY id", TABLE_NAME).as_str())
            .fetch_all(&mut **tx)
            .await?,
    )
}

pub async fn get_user_by_id(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
) -> anyhow::Result<Option<User>> {
    Ok(
        sqlx::query_as(format!("SELECT * FROM {} WHERE id = $1", TABLE_NAME).as_str())
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?,
    )
}

pub async fn get_user_by_email(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
) -> anyhow::Result<Option<User>> {
    Ok(
        sqlx::query_as(format!("SELECT * FROM {} WHERE email = $1", TABLE_NAME).as_str())
            .bind(email)
            .fetch_optional(&mut **tx)
            .await?,
    )
}

pub async fn get_address_by_user_id(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
) -> anyhow::Result<Option<Address>> {
    Ok(sqlx::query_as(
        format!("SELECT * FROM {} WHERE user_id = $1", ADDRESS_TABLE_NAME).as_str(),
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?)
}

/// Inserts a credential-only row (signup path). The id on the given user is
/// ignored; the database assigns one.
pub async fn create_credential(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
) -> anyhow::Result<User> {
    Ok(sqlx::query_as(
        format!(
            r#"
        INSERT INTO {} (first_name, last_name, email, password, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(user.created_date)
    .bind(user.updated_date)
    .fetch_one(&mut **tx)
    .await?)
}

/// Inserts the user row and its address row inside the caller's transaction,
/// so a failed address write rolls the user back too.
pub async fn create_user_with_address(
    tx: &mut Transaction<'_, Postgres>,
    user: &User,
    address: &Address,
) -> anyhow::Result<(User, Address)> {
    let created_user: User = sqlx::query_as(
        format!(
            r#"
        INSERT INTO {} (first_name, last_name, email, password, profile_pic, appointment_letter, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.profile_pic)
    .bind(&user.appointment_letter)
    .bind(user.created_date)
    .bind(user.updated_date)
    .fetch_one(&mut **tx)
    .await?;

    let created_address: Address = sqlx::query_as(
        format!(
            r#"
        INSERT INTO {} (user_id, company_address, company_city, company_state, company_zip,
        home_address, home_city, home_state, home_zip, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
            ADDRESS_TABLE_NAME
        )
        .as_str(),
    )
    .bind(created_user.id)
    .bind(&address.company_address)
    .bind(&address.company_city)
    .bind(&address.company_state)
    .bind(&address.company_zip)
    .bind(&address.home_address)
    .bind(&address.home_city)
    .bind(&address.home_state)
    .bind(&address.home_zip)
    .bind(address.created_date)
    .bind(address.updated_date)
    .fetch_one(&mut **tx)
    .await?;

    Ok((created_user, created_address))
}

pub async fn update_user(
    tx: &mut Transaction<'_, Postgres>,
    user: &mut User,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    user.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET first_name = $1, last_name = $2, email = $3, profile_pic = $4,
            appointment_letter = $5, updated_date = $6
            WHERE id = $7"#,
            TABLE_NAME
        )
        .as_str(),
    )
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.email)
    .bind(&user.profile_pic)
    .bind(&user.appointment_letter)
    .bind(now)
    .bind(user.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn update_address(
    tx: &mut Transaction<'_, Postgres>,
    address: &mut Address,
    now: &DateTime<FixedOffset>,
) -> anyhow::Result<()> {
    address.updated_date = Some(*now);
    sqlx::query(
        format!(
            r#"UPDATE {}
            SET company_address = $1, company_city = $2, company_state = $3, company_zip = $4,
            home_address = $5, home_city = $6, home_state = $7, home_zip = $8, updated_date = $9
            WHERE id = $10"#,
            ADDRESS_TABLE_NAME
        )
        .as_str(),
    )
    .bind(&address.company_address)
    .bind(&address.company_city)
    .bind(&address.company_state)
    .bind(&address.company_zip)
    .bind(&address.home_address)
    .bind(&address.home_city)
    .bind(&address.home_state)
    .bind(&address.home_zip)
    .bind(now)
    .bind(address.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use sqlx::PgPool;

    use super::*;

    fn sample_user(email: &str) -> User {
        let now = Local::now().fixed_offset();
        User {
            id: 0,
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: email.to_string(),
            password: None,
            profile_pic: None,
            appointment_letter: None,
            created_date: Some(now),
            updated_date: Some(now),
        }
    }

    fn sample_address() -> Address {
        let now = Local::now().fixed_offset();
        Address {
            id: 0,
            user_id: 0,
            company_address: "1 Work St".to_string(),
            company_city: "Workville".to_string(),
            company_state: "WK".to_string(),
            company_zip: "123456".to_string(),
            home_address: "2 Home Rd".to_string(),
            home_city: "Hometown".to_string(),
            home_state: "HM".to_string(),
            home_zip: "654321".to_string(),
            created_date: Some(now),
            updated_date: Some(now),
        }
    }

    #[sqlx::test]
    async fn test_create_user_with_address(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut tx = pool.begin().await?;
        let (user, address) =
            create_user_with_address(&mut tx, &sample_user("a@b.com"), &sample_address()).await?;
        tx.commit().await?;

        // Expect
        assert!(user.id > 0);
        assert_eq!(address.user_id, user.id);
        let mut tx = pool.begin().await?;
        let found = get_user_by_email(&mut tx, "a@b.com").await?;
        assert!(found.is_some());
        let found = found.unwrap();
        assert!(found.password.is_none());
        let found_address = get_address_by_user_id(&mut tx, found.id).await?;
        assert!(found_address.is_some());
        assert_eq!(found_address.unwrap().company_zip, "123456");
        Ok(())
    }

    #[sqlx::test]
    async fn test_duplicate_email_rejected_by_storage(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut tx = pool.begin().await?;
        create_credential(&mut tx, &sample_user("dup@b.com")).await?;
        tx.commit().await?;

        // When
        let mut tx = pool.begin().await?;
        let res = create_credential(&mut tx, &sample_user("dup@b.com")).await;

        // Expect
        assert!(res.is_err());
        Ok(())
    }

    #[sqlx::test]
    async fn test_update_user_and_address(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut tx = pool.begin().await?;
        let (mut user, mut address) =
            create_user_with_address(&mut tx, &sample_user("c@d.com"), &sample_address()).await?;
        tx.commit().await?;

        // When
        let now = Local::now().fixed_offset();
        user.first_name = "Changed".to_string();
        address.home_zip = "111111".to_string();
        let mut tx = pool.begin().await?;
        update_user(&mut tx, &mut user, &now).await?;
        update_address(&mut tx, &mut address, &now).await?;
        tx.commit().await?;

        // Expect
        let mut tx = pool.begin().await?;
        let found = get_user_by_id(&mut tx, user.id).await?.unwrap();
        assert_eq!(found.first_name, "Changed");
        let found_address = get_address_by_user_id(&mut tx, user.id).await?.unwrap();
        assert_eq!(found_address.home_zip, "111111");
        Ok(())
    }
}
