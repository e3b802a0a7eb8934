use crate::error::config::ConfigError;

static DEFAULT_WEATHER_API_URL: &str = "https://api.weatherapi.com";
static DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

pub struct Config {
    pub weather_api_url: String,
    pub weather_api_key: String,
    pub weather_api_key_2: String,
    pub database_url: String,
    pub valkey_url: String,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            weather_api_url: optional_env_var("WEATHER_API_URL", DEFAULT_WEATHER_API_URL),
            weather_api_key: env_var("WEATHER_API_KEY")?,
            weather_api_key_2: env_var("WEATHER_API_KEY_2")?,
            database_url: env_var("DATABASE_URL")?,
            valkey_url: env_var("VALKEY_URL")?,
            listen_addr: optional_env_var("LISTEN_ADDR", DEFAULT_LISTEN_ADDR),
        })
    }
}

fn env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env_var(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
