//! Scoring engine configuration.
//!
//! Every field has a default so an empty document is a valid config.
//! Loaded from YAML, JSON or TOML; the camelCase names used by existing
//! callers (`softmaxTemp`, `fcExpectedMin`, `typePrototypes`) are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrismError, Result};
use crate::prototypes::PrototypeTable;

/// Env var naming a config file for [`EngineConfig::discover`].
pub const CONFIG_ENV_VAR: &str = "PRISM_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Softmax temperature; lower sharpens, higher flattens
    #[serde(default = "default_softmax_temp", alias = "softmaxTemp")]
    pub softmax_temp: f64,

    /// Expected forced-choice exposures per function (normalizing denominator)
    #[serde(default = "default_fc_expected_min", alias = "fcExpectedMin")]
    pub fc_expected_min: f64,

    #[serde(default = "default_results_version", alias = "resultsVersion")]
    pub results_version: String,

    /// Gap to second below which a result is flagged as a close call
    #[serde(default = "default_close_call_threshold")]
    pub close_call_threshold: f64,

    /// Prototype override; `None` uses the fixed reference table
    #[serde(default, alias = "typePrototypes", skip_serializing_if = "Option::is_none")]
    pub type_prototypes: Option<PrototypeTable>,

    #[serde(default)]
    pub conf_raw_params: ConfRawParams,

    #[serde(default)]
    pub conf_band_cuts: ConfBandCuts,

    #[serde(default)]
    pub fit_band_thresholds: FitBandThresholds,

    /// Type score treated as a perfect fit (100%) for fit bands and distance norms
    #[serde(default = "default_fit_max_score")]
    pub fit_max_score: f64,

    #[serde(default)]
    pub dims_thresholds: DimsThresholds,
}

fn default_softmax_temp() -> f64 { 1.0 }
fn default_fc_expected_min() -> f64 { 12.0 }
fn default_results_version() -> String { "v1.2.1".to_string() }
fn default_close_call_threshold() -> f64 { 0.05 }
fn default_fit_max_score() -> f64 { 6.5 }

// ── Confidence and fit parameters ────────────────────────────────────────────

/// Coefficients of `conf_raw = σ(a·score_gap + b·share_gap − c·entropy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfRawParams {
    #[serde(default = "default_conf_a")]
    pub a: f64,
    #[serde(default = "default_conf_b")]
    pub b: f64,
    #[serde(default = "default_conf_c")]
    pub c: f64,
}

fn default_conf_a() -> f64 { 0.25 }
fn default_conf_b() -> f64 { 0.35 }
fn default_conf_c() -> f64 { 0.20 }

impl Default for ConfRawParams {
    fn default() -> Self {
        Self { a: default_conf_a(), b: default_conf_b(), c: default_conf_c() }
    }
}

/// Lower bounds of the High and Moderate confidence bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfBandCuts {
    #[serde(default = "default_conf_high")]
    pub high: f64,
    #[serde(default = "default_conf_moderate")]
    pub moderate: f64,
}

fn default_conf_high() -> f64 { 0.75 }
fn default_conf_moderate() -> f64 { 0.55 }

impl Default for ConfBandCuts {
    fn default() -> Self {
        Self { high: default_conf_high(), moderate: default_conf_moderate() }
    }
}

/// Fit percentage lower bounds of the high and moderate fit bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBandThresholds {
    #[serde(default = "default_high_fit")]
    pub high_fit: f64,
    #[serde(default = "default_moderate_fit")]
    pub moderate_fit: f64,
}

fn default_high_fit() -> f64 { 60.0 }
fn default_moderate_fit() -> f64 { 45.0 }

impl Default for FitBandThresholds {
    fn default() -> Self {
        Self { high_fit: default_high_fit(), moderate_fit: default_moderate_fit() }
    }
}

/// Dimension levels at which a function is highlighted as coherent or unique.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimsThresholds {
    #[serde(default = "default_dims_coherent")]
    pub coherent: f64,
    #[serde(default = "default_dims_unique")]
    pub unique: f64,
}

fn default_dims_coherent() -> f64 { 3.5 }
fn default_dims_unique() -> f64 { 4.2 }

impl Default for DimsThresholds {
    fn default() -> Self {
        Self { coherent: default_dims_coherent(), unique: default_dims_unique() }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            softmax_temp: default_softmax_temp(),
            fc_expected_min: default_fc_expected_min(),
            results_version: default_results_version(),
            close_call_threshold: default_close_call_threshold(),
            type_prototypes: None,
            conf_raw_params: ConfRawParams::default(),
            conf_band_cuts: ConfBandCuts::default(),
            fit_band_thresholds: FitBandThresholds::default(),
            fit_max_score: default_fit_max_score(),
            dims_thresholds: DimsThresholds::default(),
        }
    }
}

impl EngineConfig {
    /// Temperature actually used for scoring. Non-finite or non-positive values fall back to 1.0.
    pub fn effective_softmax_temp(&self) -> f64 {
        if self.softmax_temp.is_finite() && self.softmax_temp > 0.0 {
            self.softmax_temp
        } else {
            tracing::warn!(softmax_temp = self.softmax_temp, "invalid softmax temperature, using default");
            default_softmax_temp()
        }
    }

    /// Forced-choice denominator actually used. Non-finite or non-positive values fall back to 12.
    pub fn effective_fc_expected_min(&self) -> f64 {
        if self.fc_expected_min.is_finite() && self.fc_expected_min > 0.0 {
            self.fc_expected_min
        } else {
            tracing::warn!(fc_expected_min = self.fc_expected_min, "invalid fc_expected_min, using default");
            default_fc_expected_min()
        }
    }

    /// Perfect-fit type score actually used. Non-finite or non-positive values fall back to 6.5.
    pub fn effective_fit_max_score(&self) -> f64 {
        if self.fit_max_score.is_finite() && self.fit_max_score > 0.0 {
            self.fit_max_score
        } else {
            tracing::warn!(fit_max_score = self.fit_max_score, "invalid fit_max_score, using default");
            default_fit_max_score()
        }
    }

    /// Prototype table in effect: the override if present, otherwise the reference table.
    pub fn prototypes(&self) -> &PrototypeTable {
        match &self.type_prototypes {
            Some(table) => table,
            None        => PrototypeTable::fallback(),
        }
    }

    /// Strict check applied to configs loaded from files.
    pub fn validate(&self) -> Result<()> {
        if !(self.softmax_temp.is_finite() && self.softmax_temp > 0.0) {
            return Err(PrismError::Config(format!(
                "softmax_temp must be positive, got {}",
                self.softmax_temp
            )));
        }
        if !(self.fc_expected_min.is_finite() && self.fc_expected_min > 0.0) {
            return Err(PrismError::Config(format!(
                "fc_expected_min must be positive, got {}",
                self.fc_expected_min
            )));
        }
        if !(0.0..=1.0).contains(&self.close_call_threshold) {
            return Err(PrismError::Config(format!(
                "close_call_threshold must lie in [0, 1], got {}",
                self.close_call_threshold
            )));
        }
        if !(self.fit_max_score.is_finite() && self.fit_max_score > 0.0) {
            return Err(PrismError::Config(format!(
                "fit_max_score must be positive, got {}",
                self.fit_max_score
            )));
        }
        if self.conf_band_cuts.moderate > self.conf_band_cuts.high {
            return Err(PrismError::Config(format!(
                "conf_band_cuts: moderate {} exceeds high {}",
                self.conf_band_cuts.moderate, self.conf_band_cuts.high
            )));
        }
        if self.fit_band_thresholds.moderate_fit > self.fit_band_thresholds.high_fit {
            return Err(PrismError::Config(format!(
                "fit_band_thresholds: moderate_fit {} exceeds high_fit {}",
                self.fit_band_thresholds.moderate_fit, self.fit_band_thresholds.high_fit
            )));
        }
        if let Some(ref table) = self.type_prototypes {
            table.validate_canonical()?;
        }
        Ok(())
    }

    /// Load from YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load by file extension (`.yaml`/`.yml`, `.json`, `.toml`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(path),
            Some("json")               => Self::from_json(path),
            Some("toml")               => Self::from_toml(path),
            other => Err(PrismError::Config(format!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    /// Load the file named by `PRISM_CONFIG`, or defaults when the variable is unset.
    pub fn discover() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.is_empty() => {
                if !Path::new(&path).exists() {
                    return Err(PrismError::Config(format!("config file not found: {path}")));
                }
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save to YAML file
    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CognitiveFunction, Role, TypeCode};
    use crate::prototypes::PrototypeMap;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.softmax_temp, 1.0);
        assert_eq!(config.fc_expected_min, 12.0);
        assert_eq!(config.results_version, "v1.2.1");
        assert!(config.type_prototypes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_camel_case_aliases() {
        let config: EngineConfig = serde_json::from_str(r#"{"softmaxTemp": 0.5, "fcExpectedMin": 8}"#).unwrap();
        assert_eq!(config.softmax_temp, 0.5);
        assert_eq!(config.fc_expected_min, 8.0);
    }

    #[test]
    fn test_effective_values_sanitize() {
        let config = EngineConfig { softmax_temp: 0.0, fc_expected_min: -3.0, ..Default::default() };
        assert_eq!(config.effective_softmax_temp(), 1.0);
        assert_eq!(config.effective_fc_expected_min(), 12.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prototypes_fall_back_to_reference_table() {
        let config = EngineConfig::default();
        assert_eq!(config.prototypes().role(TypeCode::Lii, CognitiveFunction::Ti), Role::Base);
    }

    #[test]
    fn test_prototypes_borrow_override_from_config() {
        let mut funcs = PrototypeTable::default().to_map()[&TypeCode::Lii].clone();
        funcs.insert(CognitiveFunction::Fi, Role::Demonstrative);
        funcs.insert(CognitiveFunction::Se, Role::Ignoring);
        let overrides: PrototypeMap = [(TypeCode::Lii, funcs)].into_iter().collect();
        let config = EngineConfig {
            type_prototypes: Some(PrototypeTable::with_overrides(&overrides).unwrap()),
            ..Default::default()
        };

        let table: &PrototypeTable = config.prototypes();
        assert_eq!(table.role(TypeCode::Lii, CognitiveFunction::Fi), Role::Demonstrative);
        assert_eq!(table, config.type_prototypes.as_ref().unwrap());
        assert_ne!(table, PrototypeTable::fallback());
    }

    #[test]
    fn test_toml_with_override() {
        let doc = r#"
softmax_temp = 2.0

[type_prototypes.SLI]
Si = "base"
Te = "creative"
Fi = "role"
Se = "vulnerable"
Ni = "mobilizing"
Ti = "suggestive"
Ne = "ignoring"
Fe = "demonstrative"
"#;
        let config: EngineConfig = toml::from_str(doc).unwrap();
        assert_eq!(config.softmax_temp, 2.0);
        let table = config.prototypes();
        assert_eq!(table.role(TypeCode::Sli, CognitiveFunction::Ne), Role::Ignoring);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = EngineConfig { softmax_temp: 0.75, ..Default::default() };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: EngineConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_nested_thresholds_default_per_field() {
        let config: EngineConfig = serde_yaml::from_str(
            "conf_band_cuts:\n  high: 0.8\nfit_band_thresholds:\n  moderate_fit: 40\n",
        )
        .unwrap();
        assert_eq!(config.conf_band_cuts, ConfBandCuts { high: 0.8, moderate: 0.55 });
        assert_eq!(config.fit_band_thresholds, FitBandThresholds { high_fit: 60.0, moderate_fit: 40.0 });
        assert_eq!(config.conf_raw_params, ConfRawParams { a: 0.25, b: 0.35, c: 0.20 });
        assert_eq!(config.dims_thresholds, DimsThresholds { coherent: 3.5, unique: 4.2 });
        assert_eq!(config.fit_max_score, 6.5);
    }

    #[test]
    fn test_validate_rejects_inverted_bands() {
        let config = EngineConfig {
            conf_band_cuts: ConfBandCuts { high: 0.5, moderate: 0.6 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PrismError::Config(_))));

        let config = EngineConfig { fit_max_score: 0.0, ..Default::default() };
        assert!(config.validate().is_err());
        assert_eq!(config.effective_fit_max_score(), 6.5);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        assert!(matches!(EngineConfig::load("engine.ini"), Err(PrismError::Config(_))));
    }
}
