use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Path value that selects a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    /// Let SQLite enforce foreign keys natively (`PRAGMA foreign_keys`)
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
}

fn default_true() -> bool {
    true
}

impl DatabaseConfig {
    pub fn in_memory() -> Self {
        Self {
            path: IN_MEMORY.to_string(),
            foreign_keys: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/contributors.db"
foreign_keys = true
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                return load_config_from(&config_path);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

pub fn load_config_from(path: &Path) -> anyhow::Result<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &DatabaseConfig) -> anyhow::Result<PathBuf> {
    let db_path = Path::new(&config.path);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(&config.path))
}

/// Connection URL for sea-orm / sqlx
pub fn build_sqlite_url(config: &DatabaseConfig) -> anyhow::Result<String> {
    if config.is_in_memory() {
        return Ok("sqlite::memory:".to_string());
    }

    let path = get_database_path(config)?;
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    Ok(format!("sqlite://{}{}?mode=rwc", prefix, normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/contributors.db");
        assert!(config.database.foreign_keys);
    }

    #[test]
    fn test_foreign_keys_default_to_enabled() {
        let config: Config = toml::from_str("[database]\npath = \"app.db\"\n").unwrap();
        assert!(config.database.foreign_keys);
    }

    #[test]
    fn test_in_memory_url() {
        let url = build_sqlite_url(&DatabaseConfig::in_memory()).unwrap();
        assert_eq!(url, "sqlite::memory:");
    }

    #[test]
    fn test_absolute_path_url() {
        let config = DatabaseConfig {
            path: "/var/lib/contributors/app.db".into(),
            foreign_keys: true,
        };
        assert_eq!(
            build_sqlite_url(&config).unwrap(),
            "sqlite:///var/lib/contributors/app.db?mode=rwc"
        );
    }
}
