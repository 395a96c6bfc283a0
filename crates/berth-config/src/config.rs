use crate::{ConfigErrorResult, LoggingConfig, ServerConfig};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Build a config from defaults plus `BERTH_*` environment overrides.
    ///
    /// There is no config file: embedding hosts construct a `Config` (or a
    /// `ServerConfig`) themselves and hand it over already built.
    ///
    /// Does NOT validate - call validate() after from_env().
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Validate all configuration.
    /// Call after from_env() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        Ok(())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {} (control port {})",
            self.server.bind_addr(),
            self.server.control_port
        );

        match self.server.base_uri() {
            Ok(uri) => info!("  base uri: {uri}"),
            Err(e) => info!("  base uri: invalid ({e})"),
        }

        info!(
            "  shutdown: wait {}ms for prior instance, open_browser={}, stop_only={}",
            self.server.shutdown_timeout_ms, self.server.open_browser, self.server.stop_only
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("BERTH_HOST_NAME", &mut self.server.host_name);
        Self::apply_env_parse("BERTH_PORT", &mut self.server.port);
        Self::apply_env_parse("BERTH_CONTROL_PORT", &mut self.server.control_port);
        Self::apply_env_string("BERTH_PATH_PREFIX", &mut self.server.path_prefix);
        Self::apply_env_parse(
            "BERTH_SHUTDOWN_TIMEOUT_MS",
            &mut self.server.shutdown_timeout_ms,
        );
        Self::apply_env_bool("BERTH_OPEN_BROWSER", &mut self.server.open_browser);
        Self::apply_env_bool("BERTH_STOP_ONLY", &mut self.server.stop_only);

        // Logging
        Self::apply_env_parse("BERTH_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("BERTH_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("BERTH_LOG_FILE", &mut self.logging.file);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}
