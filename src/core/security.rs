use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use chrono::{Duration, Local};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use poem::Request;
use poem_openapi::{auth::Bearer, SecurityScheme};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};

use crate::{model::user::User, repository::user::get_user_by_id, settings::Config};

/// password hashing
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

/// password hash verification
pub fn verify_hash_password(
    password: &str,
    password_hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(password_hash)?;
    let verify = Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok();
    Ok(verify)
}

#[cfg(test)]
mod test_hash_password {
    use super::*;

    #[test]
    fn test_hashing_password() {
        let password = "secretpassword";
        let hash = hash_password(&password);
        assert!(hash.is_ok());
        let hash = hash.unwrap();
        let verify = verify_hash_password(&password, &hash);
        assert!(verify.is_ok());
        assert!(verify.unwrap());
        let verify_false = verify_hash_password("wrongpassword", &hash);
        assert!(verify_false.is_ok());
        assert_eq!(verify_false.unwrap(), false);
    }
}

pub struct Keys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: i32,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i32, config: Config) -> Self {
        let exp = (Local::now() + Duration::minutes(config.jwt_exp as i64)).timestamp();

        Self { id: user_id, exp }
    }
}

/// Generate token
pub fn encode_token(claims: &Claims, jwt_secret: String) -> anyhow::Result<String> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &keys.encoding)?;
    Ok(token)
}

/// Extract payload and Validate token
pub fn decode_token(token: &str, jwt_secret: String) -> anyhow::Result<Claims> {
    let keys = Keys::new(jwt_secret.as_bytes());
    let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())?;
    Ok(token_data.claims)
}

pub async fn generate_token_from_user(user: &User, config: Config) -> anyhow::Result<String> {
    let claims = Claims::new(user.id, config.clone());
    let token = encode_token(&claims, config.jwt_secret)?;
    Ok(token)
}

/// Tokens are stateless. A missing, malformed or expired token resolves to
/// None rather than an error, as does an id that no longer matches a row.
pub async fn get_user_from_token(
    tx: &mut Transaction<'_, Postgres>,
    jwt_token: Option<String>,
    config: Config,
) -> anyhow::Result<Option<User>> {
    if jwt_token.is_none() {
        return Ok(None);
    }
    let claims = match decode_token(jwt_token.unwrap().as_str(), config.jwt_secret) {
        Ok(val) => val,
        Err(_) => return Ok(None),
    };
    let user = get_user_by_id(tx, claims.id).await?;
    Ok(user)
}


#[derive(Debug, Serialize, Deserialize)]
pub struct UserApiKey {
    pub token: Option<String>,
}

/// ApiKey authorization
#[derive(SecurityScheme)]
#[oai(ty = "bearer", checker = "bearer_checker")]
pub struct BearerAuthorization(pub UserApiKey);

pub async fn bearer_checker(_req: &Request, api_key: Bearer) -> Option<UserApiKey> {
    Some(UserApiKey {
        token: Some(api_key.token),
    })
}
