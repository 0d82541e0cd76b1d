use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Session and refresh token settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret shared by issuer and validator
    pub secret: String,
    /// Upper bound for session tokens, also the TTL used on refresh
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_seconds: i64,
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_days: i64,
}

fn default_access_token_ttl() -> i64 {
    crate::auth::MAX_SESSION_TTL_SECONDS
}

fn default_refresh_token_ttl() -> i64 {
    60
}

impl AuthSettings {
    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.refresh_token_ttl_days)
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.access_token_ttl_seconds)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::Message("auth.secret must not be empty".to_string()));
        }
        if self.access_token_ttl_seconds <= 0 {
            return Err(ConfigError::Message(
                "auth.access_token_ttl_seconds must be positive".to_string(),
            ));
        }
        if self.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Message(
                "auth.refresh_token_ttl_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads `configuration.yaml` (if present) overlaid with `APP_*` variables,
/// e.g. `APP_AUTH__SECRET`.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    let settings = settings.try_deserialize::<Settings>()?;
    settings.auth.validate()?;

    Ok(settings)
}
