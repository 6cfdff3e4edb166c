/// Default OpenWeatherMap API root (data 2.5).
pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub port: u16,
    /// Provider API root, overridable so tests and staging can point elsewhere.
    pub provider_base_url: String,
    /// Unit system forwarded to the provider (`metric`, `imperial`, `standard`).
    pub units: String,
    /// Language of the provider's condition descriptions.
    pub lang: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENWEATHERMAP_API_KEY")
                .expect("OPENWEATHERMAP_API_KEY must be set"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            provider_base_url: std::env::var("OPENWEATHERMAP_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PROVIDER_BASE_URL.to_string()),
            units: std::env::var("OPENWEATHERMAP_UNITS").unwrap_or_else(|_| "metric".to_string()),
            lang: std::env::var("OPENWEATHERMAP_LANG").unwrap_or_else(|_| "fr".to_string()),
        }
    }
}
