use anyhow::{anyhow, Context, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::config;

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub secret: String,
    pub ttl_seconds: u64,
}

/// Bearer verification parameters shared with the user service that issues
/// the tokens. Only the secret is mandatory; issuer/audience default to the
/// values the service family agrees on.
pub fn jwt_config_from_env() -> Result<JwtConfig> {
    let ttl_raw = config::env_or("JWT_TTL_SECONDS", "3600");
    let ttl_seconds = ttl_raw
        .parse::<u64>()
        .with_context(|| format!("JWT_TTL_SECONDS must be a number, got {ttl_raw}"))?;
    Ok(JwtConfig {
        issuer: config::env_or("JWT_ISSUER", "user-service"),
        audience: config::env_or("JWT_AUDIENCE", "diary-api"),
        secret: config::required_env("JWT_SECRET")?,
        ttl_seconds,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
    pub aud: String,
    pub iss: String,
}

pub fn issue_token(user_id: &str, config: &JwtConfig) -> Result<(String, AccessTokenClaims)> {
    let now = unix_seconds()?;
    let exp = now
        .checked_add(config.ttl_seconds)
        .ok_or_else(|| anyhow!("token expiry overflow"))?;

    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        exp: exp as usize,
        iat: now as usize,
        jti: Uuid::new_v4().to_string(),
        aud: config.audience.clone(),
        iss: config.issuer.clone(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, config: &JwtConfig) -> Result<AccessTokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[config.audience.as_str()]);
    validation.set_issuer(&[config.issuer.as_str()]);

    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

pub fn unix_seconds() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .map_err(|_| anyhow!("invalid system clock"))
}
