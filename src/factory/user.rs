use chrono::{DateTime, FixedOffset};
use fake::{faker::internet::en::SafeEmail, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;

use crate::model::user::User;

pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let data = UserDummy::new().generate_one();
        let data = (self.modifier_one)(&data, ext);
        let created: User = sqlx::query_as(
            r#"
        INSERT INTO public.users (first_name, last_name, email, password, profile_pic, appointment_letter, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *"#,
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password)
        .bind(&data.profile_pic)
        .bind(&data.appointment_letter)
        .bind(data.created_date)
        .bind(data.updated_date)
        .fetch_one(db)
        .await?;
        Ok(created)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let data = UserDummy::new().generate_many(num);
        let mut modified: Vec<User> = vec![];
        for (idx, item) in data.iter().enumerate() {
            modified.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut result: Vec<User> = vec![];
        let mut tx = db.begin().await?;
        for item in modified {
            let created: User = sqlx::query_as(
                r#"
            INSERT INTO public.users (first_name, last_name, email, password, profile_pic, appointment_letter, created_date, updated_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *"#,
            )
            .bind(&item.first_name)
            .bind(&item.last_name)
            .bind(&item.email)
            .bind(&item.password)
            .bind(&item.profile_pic)
            .bind(&item.appointment_letter)
            .bind(item.created_date)
            .bind(item.updated_date)
            .fetch_one(&mut *tx)
            .await?;
            result.push(created);
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub first_name: String,
    pub last_name: String,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
    pub password: Option<String>,
    pub profile_pic: Option<String>,
    pub appointment_letter: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl UserDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    fn to_user(dummy: UserDummy) -> User {
        User {
            id: 0,
            first_name: dummy.first_name,
            last_name: dummy.last_name,
            email: dummy.email,
            password: dummy.password,
            profile_pic: dummy.profile_pic,
            appointment_letter: dummy.appointment_letter,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }

    pub fn generate_one(&self) -> User {
        Self::to_user(Faker.fake::<Self>())
    }

    pub fn generate_many(&self, num: u32) -> Vec<User> {
        let mut result: Vec<User> = vec![];
        for idx in 0..num {
            let mut dummy = Faker.fake::<Self>();
            // SafeEmail alone can collide across a batch
            dummy.email = format!("{}.{}", idx, dummy.email);
            result.push(Self::to_user(dummy));
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use sqlx::PgPool;

    use crate::{factory::user::UserFactory, model::user::User};

    #[sqlx::test]
    async fn test_generate_one(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::new();
        factory.generate_one(&pool, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.users"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_one_modified(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::<String>::new();
        factory.modified_one(|data, ext| User {
            id: data.id,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: ext,
            password: None,
            profile_pic: data.profile_pic.clone(),
            appointment_letter: None,
            created_date: Some(Local::now().fixed_offset()),
            updated_date: Some(Local::now().fixed_offset()),
        });
        let created = factory
            .generate_one(&pool, "fixed@example.com".to_string())
            .await?;

        // Expect
        assert!(created.id > 0);
        let res: (String, String, Option<String>) =
            sqlx::query_as(r#"SELECT first_name, email, password FROM public.users WHERE id = $1"#)
                .bind(created.id)
                .fetch_one(&pool)
                .await?;
        assert_eq!(res.0, "Test".to_string());
        assert_eq!(res.1, "fixed@example.com".to_string());
        assert!(res.2.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_generate_many(pool: PgPool) -> anyhow::Result<()> {
        // When
        let mut factory = UserFactory::new();
        factory.generate_many(&pool, 10, ()).await?;

        // Expect
        let num_data: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM public.users"#)
            .fetch_one(&pool)
            .await?;
        assert_eq!(num_data.0, 10);
        Ok(())
    }
}
