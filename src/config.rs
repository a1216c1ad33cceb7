use std::net::SocketAddr;

use anyhow::Context;
use serde::Deserialize;

/// How tokens from the identity provider are verified.
#[derive(Debug, Clone, Deserialize)]
pub enum IdpKey {
    /// HS256 shared secret.
    Secret(String),
    /// RS256 public key in PEM form.
    RsaPublicPem(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdpConfig {
    pub issuer: String,
    pub audience: String,
    pub key: IdpKey,
    pub user_role: String,
    pub admin_role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub idp: IdpConfig,
    /// `None` means permissive CORS.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub seed_catalog: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let key = match (
            std::env::var("IDP_JWT_SECRET").ok(),
            std::env::var("IDP_PUBLIC_KEY_PEM").ok(),
        ) {
            (_, Some(pem)) if !pem.trim().is_empty() => IdpKey::RsaPublicPem(pem),
            (Some(secret), _) if !secret.is_empty() => IdpKey::Secret(secret),
            _ => anyhow::bail!("either IDP_PUBLIC_KEY_PEM or IDP_JWT_SECRET must be set"),
        };

        let idp = IdpConfig {
            issuer: std::env::var("IDP_ISSUER").context("IDP_ISSUER must be set")?,
            audience: std::env::var("IDP_AUDIENCE").unwrap_or_else(|_| "account".into()),
            key,
            user_role: std::env::var("IDP_USER_ROLE").unwrap_or_else(|_| "user".into()),
            admin_role: std::env::var("IDP_ADMIN_ROLE").unwrap_or_else(|_| "admin".into()),
        };

        let port = match std::env::var("APP_PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {raw}"))?,
            Err(_) => 8080,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            database_url,
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            idp,
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .and_then(|v| parse_origins(&v)),
            seed_catalog: std::env::var("SEED_CATALOG")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }

    /// `host` must be an IP literal; names are not resolved.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!origins.is_empty()).then_some(origins)
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
