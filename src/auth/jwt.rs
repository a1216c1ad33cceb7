use axum::extract::FromRef;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::claims::Claims;
use crate::{
    config::{IdpConfig, IdpKey},
    state::AppState,
};

/// Verification material for identity provider tokens.
#[derive(Clone)]
pub struct IdpKeys {
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub user_role: String,
    pub admin_role: String,
}

impl FromRef<AppState> for IdpKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl IdpKeys {
    pub fn from_config(config: &IdpConfig) -> anyhow::Result<Self> {
        let (decoding, algorithm) = match &config.key {
            IdpKey::Secret(secret) => (DecodingKey::from_secret(secret.as_bytes()), Algorithm::HS256),
            IdpKey::RsaPublicPem(pem) => (DecodingKey::from_rsa_pem(pem.as_bytes())?, Algorithm::RS256),
        };
        Ok(Self {
            decoding,
            algorithm,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            user_role: config.user_role.clone(),
            admin_role: config.admin_role.clone(),
        })
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::auth::claims::Audience;
    use uuid::Uuid;

    fn keys() -> IdpKeys {
        IdpKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn verifies_token_signed_with_shared_secret() {
        let sub = Uuid::new_v4();
        let token = sign(&claims(sub, &["user"]), TEST_SECRET);
        let verified = keys().verify(&token).expect("verify token");
        assert_eq!(verified.sub, sub);
        assert_eq!(verified.iss, TEST_ISSUER);
        assert!(verified.has_role("user"));
    }

    #[tokio::test]
    async fn accepts_audience_lists() {
        let mut c = claims(Uuid::new_v4(), &["user"]);
        c.aud = Audience::Many(vec!["other".into(), TEST_AUDIENCE.into()]);
        assert!(keys().verify(&sign(&c, TEST_SECRET)).is_ok());
    }

    #[tokio::test]
    async fn rejects_wrong_secret_issuer_or_audience() {
        let keys = keys();
        let sub = Uuid::new_v4();

        assert!(keys.verify(&sign(&claims(sub, &[]), "other-secret")).is_err());

        let mut wrong_iss = claims(sub, &[]);
        wrong_iss.iss = "someone-else".into();
        assert!(keys.verify(&sign(&wrong_iss, TEST_SECRET)).is_err());

        let mut wrong_aud = claims(sub, &[]);
        wrong_aud.aud = Audience::One("nope".into());
        assert!(keys.verify(&sign(&wrong_aud, TEST_SECRET)).is_err());
    }

    #[tokio::test]
    async fn rejects_expired_tokens() {
        let mut c = claims(Uuid::new_v4(), &["user"]);
        c.exp = 1_000;
        assert!(keys().verify(&sign(&c, TEST_SECRET)).is_err());
    }

    #[test]
    fn malformed_pem_is_a_config_error() {
        let config = IdpConfig {
            issuer: "iss".into(),
            audience: "aud".into(),
            key: IdpKey::RsaPublicPem("not a pem".into()),
            user_role: "user".into(),
            admin_role: "admin".into(),
        };
        assert!(IdpKeys::from_config(&config).is_err());
    }
}
