pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        pub jwt_secret: String,
        /// Marks the session cookie `Secure`. Enable when served over HTTPS.
        #[serde(default)]
        pub cookie_secure: bool,
        #[serde(default = "default_session_max_age_days")]
        pub session_max_age_days: i64,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_session_max_age_days() -> i64 {
        30
    }
}

pub mod auth;
pub mod category;
pub mod entities;
pub mod expense;
pub mod payment_mode;
pub mod query;
pub mod summary;
pub mod todo;
pub mod user;
pub mod web;
