use chrono::{DateTime, FixedOffset};
use fake::{faker::number::en::NumberWithFormat, Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;

use crate::model::address::Address;

pub struct AddressFactory<T: Clone> {
    modifier_one: fn(x: &Address, ext: T) -> Address,
}

impl<T: Clone> Default for AddressFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> AddressFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Address, ext: T) -> Address) {
        self.modifier_one = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Address> {
        let data = AddressDummy::new().generate_one();
        let data = (self.modifier_one)(&data, ext);
        let created: Address = sqlx::query_as(
            r#"
        INSERT INTO public.addresses (user_id, company_address, company_city, company_state, company_zip,
        home_address, home_city, home_state, home_zip, created_date, updated_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *"#,
        )
        .bind(data.user_id)
        .bind(&data.company_address)
        .bind(&data.company_city)
        .bind(&data.company_state)
        .bind(&data.company_zip)
        .bind(&data.home_address)
        .bind(&data.home_city)
        .bind(&data.home_state)
        .bind(&data.home_zip)
        .bind(data.created_date)
        .bind(data.updated_date)
        .fetch_one(db)
        .await?;
        Ok(created)
    }
}

#[derive(Debug, Default, Deserialize, Dummy, Clone)]
struct AddressDummy {
    pub company_address: String,
    pub company_city: String,
    pub company_state: String,
    #[dummy(faker = "NumberWithFormat(\"######\")")]
    pub company_zip: String,
    pub home_address: String,
    pub home_city: String,
    pub home_state: String,
    #[dummy(faker = "NumberWithFormat(\"######\")")]
    pub home_zip: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}

impl AddressDummy {
    pub fn new() -> Self {
        Faker.fake::<Self>()
    }

    pub fn generate_one(&self) -> Address {
        let dummy = Faker.fake::<Self>();
        Address {
            id: 0,
            // callers bind this to a real user through the modifier
            user_id: 0,
            company_address: dummy.company_address,
            company_city: dummy.company_city,
            company_state: dummy.company_state,
            company_zip: dummy.company_zip,
            home_address: dummy.home_address,
            home_city: dummy.home_city,
            home_state: dummy.home_state,
            home_zip: dummy.home_zip,
            created_date: dummy.created_date,
            updated_date: dummy.updated_date,
        }
    }
}
