use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for the contract workflow client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlotContractConfig {
    /// Collaborator service endpoints
    pub api: ApiConfig,
    /// How eligibility requests are built
    pub eligibility: EligibilityConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the extraction / inheritance service
    pub base_url: String,
    /// Path of the multipart extraction endpoint
    pub extract_path: String,
    /// Path of the eligibility check endpoint
    pub check_path: String,
    /// Client-side timeout; unset means wait indefinitely
    pub request_timeout_secs: Option<u64>,
}

/// What the eligibility check is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityBasis {
    /// Only the heir relationship (plus the placeholder contract id)
    #[default]
    RelationshipOnly,
    /// Also send the freshly extracted contract fields
    ExtractedContract,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// Placeholder id meaning "no persisted contract yet"
    pub contract_id: i64,
    pub basis: EligibilityBasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            extract_path: "/api/v1/contracts/extract".to_string(),
            check_path: "/api/v1/inheritance/check".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            contract_id: 0,
            basis: EligibilityBasis::RelationshipOnly,
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl PlotContractConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (plot-contract.toml)
    /// 3. Environment variables (prefixed with PLOT_CONTRACT_, nested keys split by `__`)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("plot-contract.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = Config::builder();

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PLOT_CONTRACT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists; returns whether one was loaded
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        dotenvy::from_path(path)?;
        Ok(true)
    }
}

/// Configuration loaded once per process, plus what happened to `.env`
struct LoadedConfig {
    config: Result<PlotContractConfig>,
    env_file: Result<bool>,
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<LoadedConfig> = std::sync::LazyLock::new(|| {
    // .env must be applied before the environment source is read
    let env_file = PlotContractConfig::load_env_file();
    LoadedConfig {
        config: PlotContractConfig::load(),
        env_file,
    }
});

/// Get the global configuration
pub fn config() -> Result<&'static PlotContractConfig> {
    CONFIG
        .config
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration and report how it was loaded
///
/// Call after telemetry is up so the outcome is logged.
pub fn init_config() -> Result<()> {
    match &CONFIG.env_file {
        Ok(true) => tracing::info!("Loaded environment variables from .env file"),
        Ok(false) => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring malformed .env file"),
    }
    let _config = config()?;
    tracing::info!("Configuration loaded successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_collaborator_endpoints() {
        let config = PlotContractConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.extract_path, "/api/v1/contracts/extract");
        assert_eq!(config.api.check_path, "/api/v1/inheritance/check");
        assert_eq!(config.api.request_timeout_secs, None);
        assert_eq!(config.eligibility.contract_id, 0);
        assert_eq!(config.eligibility.basis, EligibilityBasis::RelationshipOnly);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://ocr.internal:9000\"\n\n[eligibility]\nbasis = \"extracted_contract\""
        )
        .unwrap();

        let config = PlotContractConfig::load_from(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://ocr.internal:9000");
        assert_eq!(config.api.check_path, "/api/v1/inheritance/check");
        assert_eq!(config.eligibility.basis, EligibilityBasis::ExtractedContract);
        assert_eq!(config.observability.log_level, "warn");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PlotContractConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[api]"));
        let parsed: PlotContractConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.api, config.api);
        assert_eq!(parsed.eligibility, config.eligibility);
    }

    #[test]
    fn test_save_to_file_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot-contract.toml");
        let mut config = PlotContractConfig::default();
        config.api.base_url = "http://ocr.internal:9000".to_string();
        config.api.request_timeout_secs = Some(30);
        config.eligibility.contract_id = 42;
        config.eligibility.basis = EligibilityBasis::ExtractedContract;

        config.save_to_file(&path).unwrap();
        let loaded = PlotContractConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api, config.api);
        assert_eq!(loaded.eligibility, config.eligibility);
        assert_eq!(loaded.observability, config.observability);
    }

    #[test]
    fn test_env_file_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.env");
        assert!(!PlotContractConfig::load_env_file_from(&missing).unwrap());

        let malformed = dir.path().join("broken.env");
        std::fs::write(&malformed, "not a valid line\n").unwrap();
        assert!(PlotContractConfig::load_env_file_from(&malformed).is_err());
    }
}
