use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_address: String,
    pub bind_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_path: env::var("VETLY_DATABASE_PATH")
                .unwrap_or_else(|_| {
                    warn!("VETLY_DATABASE_PATH not set, using ./vetly.db");
                    "./vetly.db".to_string()
                }),
            bind_address: env::var("VETLY_BIND_ADDRESS")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            bind_port: env::var("VETLY_BIND_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(|| {
                    warn!("VETLY_BIND_PORT not set or invalid, using 3000");
                    3000
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_empty() {
        // Env vars are not set in the test environment by default.
        let config = AppConfig::from_env();
        assert!(!config.database_path.is_empty());
        assert_eq!(config.bind_port, 3000);
    }
}
