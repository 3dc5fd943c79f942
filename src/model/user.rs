use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::prelude::FromRow;

pub const TABLE_NAME: &str = "public.users";

#[derive(Clone, Debug, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Rows created through the record path carry no credential.
    pub password: Option<String>,
    pub profile_pic: Option<String>,
    pub appointment_letter: Option<String>,
    pub created_date: Option<DateTime<FixedOffset>>,
    pub updated_date: Option<DateTime<FixedOffset>>,
}
