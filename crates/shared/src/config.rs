//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Authorization engine configuration.
    #[serde(default)]
    pub authorization: AuthorizationConfig,
    /// Transaction workflow policy.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Authorization engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationConfig {
    /// Role that bypasses all permission grants.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// How long the resource-type catalog is cached, in seconds.
    #[serde(default = "default_resource_cache_ttl")]
    pub resource_cache_ttl_secs: u64,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            admin_role: default_admin_role(),
            resource_cache_ttl_secs: default_resource_cache_ttl(),
        }
    }
}

fn default_admin_role() -> String {
    "ROLE_ADMIN".to_string()
}

fn default_resource_cache_ttl() -> u64 {
    60
}

/// Business policy knobs for the transaction workflow.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Whether a paid transaction may be reopened back to draft.
    #[serde(default = "default_true")]
    pub allow_reopen_paid: bool,
    /// Whether `invoice` requires a positive gross total.
    #[serde(default)]
    pub require_total_before_invoice: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            allow_reopen_paid: true,
            require_total_before_invoice: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `ATRIUM__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("ATRIUM").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("ATRIUM__DATABASE__URL", Some("postgres://localhost/atrium_test")),
                ("ATRIUM__JWT__SECRET", Some("secret")),
                ("ATRIUM__SERVER__PORT", Some("9090")),
                ("ATRIUM__AUTHORIZATION__ADMIN_ROLE", Some("ROLE_SUPER_ADMIN")),
                ("ATRIUM__WORKFLOW__ALLOW_REOPEN_PAID", Some("false")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/atrium_test");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.authorization.admin_role, "ROLE_SUPER_ADMIN");
                assert_eq!(config.authorization.resource_cache_ttl_secs, 60);
                assert!(!config.workflow.allow_reopen_paid);
                assert!(!config.workflow.require_total_before_invoice);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("ATRIUM__DATABASE__URL", None::<&str>),
                ("ATRIUM__JWT__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_section_defaults() {
        let auth = AuthorizationConfig::default();
        assert_eq!(auth.admin_role, "ROLE_ADMIN");

        let workflow = WorkflowConfig::default();
        assert!(workflow.allow_reopen_paid);
        assert!(!workflow.require_total_before_invoice);
    }
}
