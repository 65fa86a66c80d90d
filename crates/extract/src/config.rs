use serde::Deserialize;

use crate::error::ExtractError;

/// Engine configuration. Every knob has a default; `from_toml` is for
/// deployments that tune extraction per document source.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Characters of free text kept on each side of an identifier token.
    #[serde(default = "default_window_chars")]
    pub window_chars: usize,
    /// Relative tolerance for the `value ≈ quantity × price` check.
    #[serde(default = "default_value_tolerance")]
    pub value_tolerance: f64,
}

fn default_name() -> String {
    "default".to_string()
}

fn default_window_chars() -> usize {
    200
}

fn default_value_tolerance() -> f64 {
    0.01
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            window_chars: default_window_chars(),
            value_tolerance: default_value_tolerance(),
        }
    }
}

impl ExtractConfig {
    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let config: ExtractConfig =
            toml::from_str(input).map_err(|e| ExtractError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.window_chars == 0 {
            return Err(ExtractError::ConfigValidation(
                "window_chars must be greater than 0".into(),
            ));
        }
        if !self.value_tolerance.is_finite() || self.value_tolerance < 0.0 {
            return Err(ExtractError::ConfigValidation(format!(
                "value_tolerance must be finite and non-negative, got {}",
                self.value_tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ExtractConfig::default();
        assert_eq!(config.name, "default");
        assert_eq!(config.window_chars, 200);
        assert_eq!(config.value_tolerance, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full() {
        let config = ExtractConfig::from_toml(
            r#"
name = "Custody Statements"
window_chars = 120
value_tolerance = 0.005
"#,
        )
        .unwrap();
        assert_eq!(config.name, "Custody Statements");
        assert_eq!(config.window_chars, 120);
        assert_eq!(config.value_tolerance, 0.005);
    }

    #[test]
    fn parse_partial_uses_defaults() {
        let config = ExtractConfig::from_toml(r#"name = "Minimal""#).unwrap();
        assert_eq!(config.window_chars, 200);
        assert_eq!(config.value_tolerance, 0.01);
    }

    #[test]
    fn reject_zero_window() {
        let err = ExtractConfig::from_toml("window_chars = 0").unwrap_err();
        assert!(err.to_string().contains("window_chars"));
    }

    #[test]
    fn reject_negative_tolerance() {
        let err = ExtractConfig::from_toml("value_tolerance = -0.5").unwrap_err();
        assert!(err.to_string().contains("value_tolerance"));
    }

    #[test]
    fn reject_malformed_toml() {
        let err = ExtractConfig::from_toml("window_chars = ").unwrap_err();
        assert!(matches!(err, ExtractError::ConfigParse(_)));
    }
}
