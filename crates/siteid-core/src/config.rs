use crate::error::Result;
use crate::fix::FixOptions;
use crate::grammar::{check_order_year, ORDER_YEARS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR: &str = ".siteid";
pub const CONFIG_FILE: &str = "config.yaml";

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// FixConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixConfig {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_effect_timeout_ms")]
    pub effect_timeout_ms: u64,
}

fn default_max_concurrency() -> usize {
    8
}

fn default_effect_timeout_ms() -> u64 {
    10_000
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            effect_timeout_ms: default_effect_timeout_ms(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pins the "current year" used for freshly generated OrderIDs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
    #[serde(default)]
    pub fix: FixConfig,
}

impl EngineConfig {
    /// Load `.siteid/config.yaml` under `root`; defaults when it is absent.
    pub fn load(root: &Path) -> Result<Self> {
        Self::load_from(&config_path(root))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: EngineConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&config_path(root), data.as_bytes())
    }

    pub fn year(&self) -> i32 {
        self.reference_year
            .unwrap_or_else(crate::grammar::current_year)
    }

    /// Options for a fix run. Fails when the configured year cannot be
    /// written into an OrderID.
    pub fn fix_options(&self) -> Result<FixOptions> {
        Ok(FixOptions {
            max_concurrency: self.fix.max_concurrency.max(1),
            effect_timeout: Duration::from_millis(self.fix.effect_timeout_ms),
            current_year: check_order_year(self.year())?,
        })
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.fix.max_concurrency == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "fix.max_concurrency is 0; fixes will run one at a time".to_string(),
            });
        }

        if self.fix.effect_timeout_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "fix.effect_timeout_ms is 0; every store call will time out"
                    .to_string(),
            });
        }

        if let Some(year) = self.reference_year {
            if !ORDER_YEARS.contains(&year) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("reference_year {year} is not a four-digit year"),
                });
            }
        }

        warnings
    }
}
