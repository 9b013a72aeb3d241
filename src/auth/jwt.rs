use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use once_cell::sync::Lazy;

use crate::models::Claims;

/// Decoding rules for reading our own token. The backend is the authority on
/// validity, so the signature and expiry are not checked here.
static INSPECT_ONLY: Lazy<Validation> = Lazy::new(|| {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
});

pub fn inspect_token(token: &str) -> Option<Claims> {
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &INSPECT_ONLY)
        .map(|data| data.claims)
        .ok()
}

pub fn expires_at(claims: &Claims) -> Option<DateTime<Utc>> {
    claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    #[test]
    fn reads_claims_without_the_secret() {
        let token = encode(
            &Header::default(),
            &json!({"sub": "admin", "exp": 1_900_000_000}),
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();

        let claims = inspect_token(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("admin"));
        assert_eq!(expires_at(&claims).map(|d| d.timestamp()), Some(1_900_000_000));
    }

    #[test]
    fn opaque_tokens_yield_nothing() {
        assert!(inspect_token("not-a-jwt").is_none());
    }
}
