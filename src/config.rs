use serde::Deserialize;

pub use config::ConfigError;

fn default_port() -> u16 {
    3000
}

/// Application configuration, read from environment variables.
///
/// `DATABASE_URL` is required; `PORT` defaults to 3000. SMTP settings are
/// read separately by [`SmtpMailer::from_env`](crate::mail::SmtpMailer::from_env).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// MongoDB connection string.
    pub database_url: String,

    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let c = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        c.try_deserialize()
    }
}
