use clap::Parser;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// MMGH administrative backend
#[derive(Parser, Serialize, Deserialize, Clone, Debug)]
#[command(name = "mmgh-server", version, about = "MMGH administrative backend")]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "MMGH_PORT", default_value = "3000")]
    pub port: u16,

    /// Bind address
    #[arg(long, env = "MMGH_BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind_address: String,

    /// Path to TOML config file
    #[arg(long, default_value = "./mmgh.toml")]
    pub config: String,

    /// Enable structured JSON logging (for Docker/production)
    #[arg(long, env = "MMGH_JSON_LOGS")]
    pub json_logs: bool,

    /// Output a commented TOML config template and exit
    #[arg(long)]
    pub generate_config: bool,

    /// Data directory for persistent state (DB, keys)
    #[arg(long, env = "MMGH_DATA_DIR", default_value = "./data")]
    pub data_dir: String,

    /// Address that receives new-registration approval emails
    #[arg(long, env = "MMGH_ADMIN_EMAIL", default_value = "admin@mmgh.local")]
    pub admin_email: String,

    /// Public base URL included in approval emails
    #[arg(long, env = "MMGH_APP_URL", default_value = "http://localhost:3000")]
    pub app_url: String,

    /// Sender address for outbound email. When unset, email delivery is
    /// skipped entirely (logged, never an error).
    #[arg(long, env = "MMGH_EMAIL_FROM")]
    pub email_from: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_address: "0.0.0.0".to_string(),
            config: "./mmgh.toml".to_string(),
            json_logs: false,
            generate_config: false,
            data_dir: "./data".to_string(),
            admin_email: "admin@mmgh.local".to_string(),
            app_url: "http://localhost:3000".to_string(),
            email_from: None,
        }
    }
}

impl Config {
    /// Load config with layered precedence:
    /// built-in defaults < TOML file < env vars (MMGH_*) < CLI args
    pub fn load() -> Result<Self, figment::Error> {
        let cli = Config::parse();
        let config_path = cli.config.clone();

        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("MMGH_"))
            .merge(Serialized::defaults(cli))
            .extract()
    }
}

/// Generate a commented TOML config template
pub fn generate_config_template() -> String {
    r#"# MMGH Administrative Backend Configuration
# Place this file at ./mmgh.toml or specify with --config <path>
# All settings can be overridden via environment variables (MMGH_PORT, etc.)
# or CLI flags (--port, etc.)

# Server port (default: 3000)
# port = 3000

# Bind address (default: 0.0.0.0 — all interfaces)
# bind_address = "0.0.0.0"

# Enable structured JSON logging for Docker/production
# json_logs = false

# Data directory for SQLite database and JWT signing key
# data_dir = "./data"

# Address that receives new-registration approval emails
# admin_email = "admin@mmgh.local"

# Public base URL included in approval emails
# app_url = "http://localhost:3000"

# Sender address for outbound email.
# Leave unset to skip email delivery entirely.
# email_from = "noreply@mmgh.local"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.admin_email, "admin@mmgh.local");
        assert!(config.email_from.is_none());
    }
}
