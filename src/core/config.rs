use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Disk,
    Memory,
}

fn default_currency() -> String {
    "KSh".to_string()
}

fn default_low_stock_threshold() -> f64 {
    10.0
}

fn default_ledger_page_sizes() -> Vec<usize> {
    vec![10, 30, 80]
}

fn default_top_items() -> usize {
    5
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    pub data_path: Option<String>,
    #[serde(default)]
    pub store: StoreBackend,
    /// Items at or below this quantity (but not empty) count as low stock.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: f64,
    #[serde(default)]
    pub allow_negative_stock: bool,
    /// Successive sizes of the daily ledger window before showing all days.
    #[serde(default = "default_ledger_page_sizes")]
    pub ledger_page_sizes: Vec<usize>,
    #[serde(default = "default_top_items")]
    pub top_items: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            currency: default_currency(),
            data_path: None,
            store: StoreBackend::default(),
            low_stock_threshold: default_low_stock_threshold(),
            allow_negative_stock: false,
            ledger_page_sizes: default_ledger_page_sizes(),
            top_items: default_top_items(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "stockbook", "stockbook")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "stockbook", "stockbook")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "USD"
data_path: "/tmp/shop"
store: memory
low_stock_threshold: 4
allow_negative_stock: true
ledger_page_sizes: [5, 15]
top_items: 3
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.data_path.as_deref(), Some("/tmp/shop"));
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.low_stock_threshold, 4.0);
        assert!(config.allow_negative_stock);
        assert_eq!(config.ledger_page_sizes, vec![5, 15]);
        assert_eq!(config.top_items, 3);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/shop")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("data_path: null\n").unwrap();
        assert_eq!(config.currency, "KSh");
        assert_eq!(config.store, StoreBackend::Disk);
        assert_eq!(config.low_stock_threshold, 10.0);
        assert!(!config.allow_negative_stock);
        assert_eq!(config.ledger_page_sizes, vec![10, 30, 80]);
        assert_eq!(config.top_items, 5);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here.yaml");
        assert!(result.is_err());
    }
}
