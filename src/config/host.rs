//! Host configuration file.
//!
//! Loaded from ./startstop.yml or ~/.config/startstop/startstop.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::ResourceConfig;
use crate::runner::LoopRunnerConfig;

/// File name searched for in the working and user config directories.
pub const CONFIG_FILE_NAME: &str = "startstop.yml";

/// Everything the host binary needs to bring up its services.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostConfig {
    /// Default log filter, overridden by RUST_LOG.
    pub log_level: Option<String>,

    /// Loop runner settings shared by every service.
    pub runner: RunnerSettings,

    /// Simulated motors available as dependencies.
    pub motors: Vec<MotorSpec>,

    /// Services to construct, in order.
    pub services: Vec<ResourceConfig>,
}

impl HostConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. startstop.yml in current directory
    /// 3. ~/.config/startstop/startstop.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_config = PathBuf::from(CONFIG_FILE_NAME);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", CONFIG_FILE_NAME);
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", CONFIG_FILE_NAME, e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("startstop").join(CONFIG_FILE_NAME);
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Structural checks: unique names and resolvable dependencies.
    ///
    /// Per-model attribute checks live with the services.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for motor in &self.motors {
            if motor.name.is_empty() {
                eyre::bail!("motor names must not be empty");
            }
            if !seen.insert(motor.name.as_str()) {
                eyre::bail!("duplicate resource name '{}'", motor.name);
            }
        }
        for service in &self.services {
            if service.name.is_empty() {
                eyre::bail!("service names must not be empty");
            }
            if !seen.insert(service.name.as_str()) {
                eyre::bail!("duplicate resource name '{}'", service.name);
            }
        }
        for service in &self.services {
            for dep in &service.depends_on {
                if self.motor(dep).is_none() {
                    eyre::bail!("service '{}' depends on unknown motor '{}'", service.name, dep);
                }
            }
        }
        Ok(())
    }

    pub fn motor(&self, name: &str) -> Option<&MotorSpec> {
        self.motors.iter().find(|m| m.name == name)
    }
}

/// Loop runner settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Hard-abort a loop that has not exited this long after stop.
    pub stop_timeout_ms: Option<u64>,

    /// Prefix for worker thread names.
    pub thread_name_prefix: String,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            stop_timeout_ms: None,
            thread_name_prefix: "loop".to_string(),
        }
    }
}

impl RunnerSettings {
    pub fn to_runner_config(&self) -> LoopRunnerConfig {
        LoopRunnerConfig {
            stop_timeout: self.stop_timeout_ms.map(Duration::from_millis),
            thread_name_prefix: self.thread_name_prefix.clone(),
        }
    }
}

/// A simulated motor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MotorSpec {
    pub name: String,

    /// Wall time per revolution of travel; 0 moves instantly.
    #[serde(default)]
    pub ms_per_revolution: u64,
}
