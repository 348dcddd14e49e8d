use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, error::TodoError};

/// Verifies bearer tokens and yields the user id they carry.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &cfg.issuer {
            validation.set_issuer(std::slice::from_ref(issuer));
        }
        match &cfg.audience {
            Some(audience) => validation.set_audience(std::slice::from_ref(audience)),
            None => validation.validate_aud = false,
        }
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
        }
    }

    /// Returns the `sub` claim of `token`, which may be bare or `"<scheme> <token>"`.
    pub fn parse_user_id(&self, token: &str) -> Result<String, TodoError> {
        let token = bare_token(token);
        if token.is_empty() {
            return Err(TodoError::Decode("empty token".into()));
        }
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(classify)?;
        if data.claims.sub.is_empty() {
            return Err(TodoError::Decode("empty sub claim".into()));
        }
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

/// Last whitespace-separated segment of an `Authorization` value. The scheme is not checked.
pub fn bare_token(raw: &str) -> &str {
    raw.split_whitespace().last().unwrap_or("")
}

fn classify(err: jsonwebtoken::errors::Error) -> TodoError {
    match err.kind() {
        ErrorKind::InvalidToken
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_) => TodoError::Decode(err.to_string()),
        _ => TodoError::Auth(err.to_string()),
    }
}
