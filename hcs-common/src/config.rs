//! Configuration loading and measurement-database path resolution

use std::path::PathBuf;

/// Environment variable overriding the measurement database path
pub const DB_ENV_VAR: &str = "HCS_MEASUREMENTS_DB";

/// Resolve the measurement database path in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`measurements_db` key)
/// 4. Platform data directory default (fallback)
pub fn resolve_database_path(cli_arg: Option<&str>) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DB_ENV_VAR) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = database_path_from_config_file() {
        return path;
    }

    // Priority 4: platform default
    default_database_path()
}

/// Read `measurements_db` from `<config_dir>/hcs/config.toml`, if present
fn database_path_from_config_file() -> Option<PathBuf> {
    let config_path = dirs::config_dir()?.join("hcs").join("config.toml");
    let toml_content = std::fs::read_to_string(&config_path).ok()?;
    let config = toml::from_str::<toml::Value>(&toml_content).ok()?;
    config
        .get("measurements_db")
        .and_then(|v| v.as_str())
        .map(PathBuf::from)
}

/// Default measurement database location under the platform data directory
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("hcs").join("measurements.db"))
        .unwrap_or_else(|| PathBuf::from("./hcs_data/measurements.db"))
}
