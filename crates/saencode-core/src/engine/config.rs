use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("File I/O error for '{path}': {message}")]
    Io { path: String, message: String },
    #[error("TOML parsing error for '{path}': {message}")]
    Toml { path: String, message: String },
}

/// How the diagonal of a dependency matrix is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelfPairConvention {
    /// Apply the general nMI formula to the pair `(i, i)`. Because of the
    /// finite-sample correction this exceeds 1 for every non-constant column.
    #[default]
    Formula,
    /// Exactly 1 for every column with non-zero entropy, 0 for constant columns.
    Identity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonConfig {
    /// Relative tolerance below zero accepted for eigenvalues before a matrix
    /// is declared not positive semi-definite.
    pub psd_tolerance: f64,
    /// Largest accepted absolute difference between `A[i, j]` and `A[j, i]`.
    pub symmetry_tolerance: f64,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            psd_tolerance: 1e-9,
            symmetry_tolerance: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisConfig {
    /// Frames per dependency block; `None` treats the whole trajectory as one block.
    pub frames_per_block: Option<usize>,
    pub self_pairs: SelfPairConvention,
    pub comparison: ComparisonConfig,
    /// Wall-clock limit for a whole analysis run.
    pub time_limit: Option<Duration>,
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    frames_per_block: Option<usize>,
    self_pairs: Option<SelfPairConvention>,
    psd_tolerance: Option<f64>,
    symmetry_tolerance: Option<f64>,
    time_limit: Option<Duration>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_per_block(mut self, frames: usize) -> Self {
        self.frames_per_block = Some(frames);
        self
    }
    pub fn self_pairs(mut self, convention: SelfPairConvention) -> Self {
        self.self_pairs = Some(convention);
        self
    }
    pub fn psd_tolerance(mut self, tolerance: f64) -> Self {
        self.psd_tolerance = Some(tolerance);
        self
    }
    pub fn symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.symmetry_tolerance = Some(tolerance);
        self
    }
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        if self.frames_per_block == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "frames_per_block",
                reason: "must be at least 1".to_string(),
            });
        }
        let defaults = ComparisonConfig::default();
        let comparison = ComparisonConfig {
            psd_tolerance: validate_tolerance(
                "psd_tolerance",
                self.psd_tolerance.unwrap_or(defaults.psd_tolerance),
            )?,
            symmetry_tolerance: validate_tolerance(
                "symmetry_tolerance",
                self.symmetry_tolerance
                    .unwrap_or(defaults.symmetry_tolerance),
            )?,
        };
        if self.time_limit == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidParameter {
                name: "time_limit",
                reason: "must be positive".to_string(),
            });
        }
        Ok(AnalysisConfig {
            frames_per_block: self.frames_per_block,
            self_pairs: self.self_pairs.unwrap_or_default(),
            comparison,
            time_limit: self.time_limit,
        })
    }
}

fn validate_tolerance(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite, non-negative number (got {value})"),
        })
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileComparisonConfig {
    psd_tolerance: Option<f64>,
    symmetry_tolerance: Option<f64>,
}

/// On-disk layout of an analysis configuration.
///
/// ```toml
/// frames-per-block = 500
/// self-pairs = "identity"
/// time-limit-secs = 3600.0
///
/// [comparison]
/// psd-tolerance = 1e-9
/// symmetry-tolerance = 1e-9
/// ```
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct FileAnalysisConfig {
    frames_per_block: Option<usize>,
    self_pairs: Option<SelfPairConvention>,
    time_limit_secs: Option<f64>,
    #[serde(default)]
    comparison: FileComparisonConfig,
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<string>")
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    fn parse(content: &str, path_for_error: &str) -> Result<Self, ConfigError> {
        let file: FileAnalysisConfig =
            toml::from_str(content).map_err(|e| ConfigError::Toml {
                path: path_for_error.to_string(),
                message: e.to_string(),
            })?;

        let mut builder = AnalysisConfigBuilder::new();
        if let Some(frames) = file.frames_per_block {
            builder = builder.frames_per_block(frames);
        }
        if let Some(convention) = file.self_pairs {
            builder = builder.self_pairs(convention);
        }
        if let Some(tolerance) = file.comparison.psd_tolerance {
            builder = builder.psd_tolerance(tolerance);
        }
        if let Some(tolerance) = file.comparison.symmetry_tolerance {
            builder = builder.symmetry_tolerance(tolerance);
        }
        if let Some(secs) = file.time_limit_secs {
            let limit = Duration::try_from_secs_f64(secs).map_err(|e| {
                ConfigError::InvalidParameter {
                    name: "time_limit",
                    reason: e.to_string(),
                }
            })?;
            builder = builder.time_limit(limit);
        }
        builder.build()
    }
}
