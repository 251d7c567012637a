use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

use shared_models::auth::{AuthUser, JwtClaims, JwtHeader};

type HmacSha256 = Hmac<Sha256>;

/// Issue an HS256 bearer token for a user id. Expiry is measured in
/// minutes from now.
pub fn issue_token(
    subject: &str,
    email: Option<&str>,
    role: Option<&str>,
    jwt_secret: &str,
    ttl_minutes: i64,
) -> Result<String, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let now = Utc::now().timestamp() as u64;
    let header = JwtHeader {
        alg: "HS256".to_string(),
        typ: "JWT".to_string(),
    };
    let claims = JwtClaims {
        sub: subject.to_string(),
        exp: Some(now + (ttl_minutes.max(0) as u64) * 60),
        iat: Some(now),
        email: email.map(|e| e.to_string()),
        role: role.map(|r| r.to_string()),
    };

    let header_json =
        serde_json::to_string(&header).map_err(|_| "Failed to encode header".to_string())?;
    let claims_json =
        serde_json::to_string(&claims).map_err(|_| "Failed to encode claims".to_string())?;

    let header_b64 = URL_SAFE_NO_PAD.encode(header_json.as_bytes());
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims_json.as_bytes());
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = HmacSha256::new_from_slice(jwt_secret.as_bytes())
        .map_err(|_| "Failed to create HMAC".to_string())?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", signing_input, signature))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<AuthUser, String> {
    if jwt_secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    // Split token into parts
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err("Invalid token format".to_string());
    }

    let header_b64 = parts[0];
    let claims_b64 = parts[1];
    let signature_b64 = parts[2];

    let signature = match URL_SAFE_NO_PAD.decode(signature_b64) {
        Ok(sig) => sig,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return Err("Invalid signature encoding".to_string());
        }
    };

    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac = match HmacSha256::new_from_slice(jwt_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return Err("Failed to create HMAC".to_string()),
    };
    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("Token signature verification failed");
        return Err("Invalid token signature".to_string());
    }

    // Decode claims
    let claims_json = match URL_SAFE_NO_PAD.decode(claims_b64) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(json_str) => json_str,
            Err(_) => return Err("Invalid claims encoding".to_string()),
        },
        Err(_) => return Err("Invalid claims encoding".to_string()),
    };

    let claims: JwtClaims = match serde_json::from_str(&claims_json) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to parse claims: {}", e);
            return Err("Invalid claims format".to_string());
        }
    };

    // Check expiration
    if let Some(exp) = claims.exp {
        let now = Utc::now().timestamp() as u64;
        if exp < now {
            debug!("Token expired at {} (now: {})", exp, now);
            return Err("Token expired".to_string());
        }
    }

    let issued_at = claims
        .iat
        .map(|timestamp| Utc.timestamp_opt(timestamp as i64, 0).single());

    let user = AuthUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
        issued_at: issued_at.flatten(),
    };

    debug!("Token validated successfully for user: {}", user.id);
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-long-enough-for-hmac";

    #[test]
    fn issued_token_validates() {
        let token = issue_token("user-123", Some("doc@example.com"), Some("doctor"), SECRET, 60)
            .unwrap();

        let user = validate_token(&token, SECRET).unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.email.as_deref(), Some("doc@example.com"));
        assert_eq!(user.role.as_deref(), Some("doctor"));
        assert!(user.issued_at.is_some());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("user-123", None, None, SECRET, 60).unwrap();

        let err = validate_token(&token, "some-other-secret").unwrap_err();
        assert_eq!(err, "Invalid token signature");
    }

    #[test]
    fn tampered_claims_are_rejected() {
        let token = issue_token("user-123", None, None, SECRET, 60).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();

        let forged = URL_SAFE_NO_PAD.encode(br#"{"sub":"someone-else"}"#);
        parts[1] = &forged;
        let tampered = parts.join(".");

        let err = validate_token(&tampered, SECRET).unwrap_err();
        assert_eq!(err, "Invalid token signature");
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(validate_token("definitely-not-a-jwt", SECRET).is_err());
    }

    #[test]
    fn empty_secret_never_signs_or_validates() {
        assert!(issue_token("user-123", None, None, "", 60).is_err());
        let token = issue_token("user-123", None, None, SECRET, 60).unwrap();
        assert!(validate_token(&token, "").is_err());
    }
}
