use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub stress: StressConfig,
    pub harness: HarnessConfig,
}

/// Identity and bind address of one slot instance. The process supervisor
/// hands these over through `ENVIRONMENT` and `PORT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub identity: String,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            identity: "BLUE".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressConfig {
    /// Exclusive upper bound of the simulated processing delay.
    pub max_delay_ms: u64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self { max_delay_ms: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub status_interval_secs: u64,
    pub max_requests: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3002".to_string(),
            request_timeout_secs: 30,
            status_interval_secs: 10,
            max_requests: 1000,
        }
    }
}

impl HarnessConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("SLOT__").split("__"))
            .merge(Env::raw().only(&["ENVIRONMENT"]).map(|_| "server.identity".into()))
            .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
    }

    pub fn load() -> Result<Self> {
        Self::figment()
            .extract()
            .context("failed to load configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.server.identity, "BLUE");
            assert_eq!(cfg.server.port, 3000);
            assert_eq!(cfg.stress.max_delay_ms, 50);
            assert_eq!(cfg.harness.max_requests, 1000);
            assert_eq!(cfg.harness.status_interval_secs, 10);
            Ok(())
        });
    }

    #[test]
    fn supervisor_variables_override_file() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            std::fs::create_dir_all(jail.directory().join("config"))
                .map_err(|e| e.to_string())?;
            jail.create_file(
                "config/default.toml",
                r#"
                [server]
                identity = "DEV"
                port = 3001
                "#,
            )?;
            jail.set_env("ENVIRONMENT", "GREEN");
            jail.set_env("PORT", "3003");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.server.identity, "GREEN");
            assert_eq!(cfg.server.port, 3003);
            Ok(())
        });
    }

    #[test]
    fn prefixed_variables_reach_nested_sections() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("SLOT__HARNESS__BASE_URL", "http://blue.internal:3002");
            jail.set_env("SLOT__STRESS__MAX_DELAY_MS", "10");

            let cfg: Config = Config::figment().extract()?;
            assert_eq!(cfg.harness.base_url, "http://blue.internal:3002");
            assert_eq!(cfg.stress.max_delay_ms, 10);
            Ok(())
        });
    }

    #[test]
    fn socket_addr_parses() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3002,
            ..ServerConfig::default()
        };
        assert_eq!(server.socket_addr().unwrap().port(), 3002);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
