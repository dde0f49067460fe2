use super::types::{HuddleConfig, RawHuddleConfig, RawServerConfig, ServerConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable holding the listening port
pub const PORT_ENV: &str = "PORT";
/// Environment variable holding the host name advertised at startup
pub const PUBLIC_HOST_ENV: &str = "WS_URI";
/// Overrides the directory of the project config file
pub const PROJECT_CONFIG_DIR_ENV: &str = "HUDDLE_PROJECT_CONFIG_DIR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project + environment)
    pub fn load() -> Result<HuddleConfig> {
        let raw = Self::load_files(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )?;
        let raw = Self::apply_env(raw, |key| std::env::var(key).ok());
        Ok(Self::finalize(raw))
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "huddle").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with HUDDLE_PROJECT_CONFIG_DIR (useful for isolated tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var(PROJECT_CONFIG_DIR_ENV) {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".huddle/config.toml")
        }
    }

    /// Layer the user file under the project file. Missing files are skipped.
    fn load_files(user_path: Option<&Path>, project_path: &Path) -> Result<RawHuddleConfig> {
        let mut raw = RawHuddleConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && let Some(user_config) = Self::read_raw(user_path)?
        {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project_path)? {
            raw = Self::merge_raw(raw, project_config);
        }

        Ok(raw)
    }

    fn read_raw(path: &Path) -> Result<Option<RawHuddleConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawHuddleConfig, overlay: RawHuddleConfig) -> RawHuddleConfig {
        RawHuddleConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                public_host: overlay.server.public_host.or(base.server.public_host),
                registration_timeout_secs: overlay
                    .server
                    .registration_timeout_secs
                    .or(base.server.registration_timeout_secs),
            },
        }
    }

    /// Apply PORT and WS_URI on top of file configuration.
    ///
    /// A PORT that is empty, zero or not a number is ignored.
    fn apply_env(
        mut raw: RawHuddleConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> RawHuddleConfig {
        if let Some(value) = lookup(PORT_ENV) {
            match value.trim().parse::<u16>() {
                Ok(port) if port != 0 => raw.server.port = Some(port),
                _ => warn!("Ignoring invalid {}={:?}", PORT_ENV, value),
            }
        }

        if let Some(host) = lookup(PUBLIC_HOST_ENV).filter(|h| !h.trim().is_empty()) {
            raw.server.public_host = Some(host);
        }

        raw
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawHuddleConfig) -> HuddleConfig {
        let defaults = ServerConfig::default();
        HuddleConfig {
            server: ServerConfig {
                host: raw.server.host.unwrap_or(defaults.host),
                port: raw.server.port.unwrap_or(defaults.port),
                public_host: raw.server.public_host.unwrap_or(defaults.public_host),
                registration_timeout_secs: raw.server.registration_timeout_secs,
            },
        }
    }
}
