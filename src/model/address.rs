use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;

pub const TABLE_NAME: &str = "public.addresses";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct Address {
    pub id: i32,
    pub user_id: i32,
    pub company_address: String,
    pub company_city: String,
    pub company_state: String,
    pub company_zip: String,
    pub home_address: String,
    pub home_city: String,
    pub home_state: String,
    pub home_zip: String,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
