use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth_service: AuthServiceSettings,
    pub garage_api: GarageApiSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub session_secret: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct AuthServiceSettings {
    /// Base URL of the external auth service credentials are proxied to.
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct GarageApiSettings {
    /// Base URL of the garage REST API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout. Keeps one hung upstream call from starving the
    /// reconciliation retry budget.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    // Check if we're already in customer-portal directory or need to navigate to it
    let configuration_directory = if base_path.ends_with("customer-portal") {
        base_path.join("config")
    } else {
        base_path.join("customer-portal").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
