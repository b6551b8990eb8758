use serde::{Deserialize, Serialize};
use shapediff_value::Value;

use crate::record::Diff;
use crate::report::DiffReport;
use crate::strict::strict_diff;
use crate::tolerant::tolerant_diff;

/// Which comparison engine to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Identical types required throughout.
    #[default]
    Strict,
    /// Values compared by shape.
    Tolerant,
}

/// Configuration for one comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub mode: DiffMode,
    /// Compare sequences as multisets. Only honored in tolerant mode.
    pub unordered: bool,
}

impl DiffConfig {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn tolerant() -> Self {
        Self {
            mode: DiffMode::Tolerant,
            ..Default::default()
        }
    }

    /// Tolerant comparison that ignores the order of comparable elements.
    pub fn tolerant_unordered() -> Self {
        Self {
            mode: DiffMode::Tolerant,
            unordered: true,
        }
    }

    /// Run the configured engine.
    pub fn compare(&self, a: &Value, b: &Value) -> Vec<Diff> {
        match self.mode {
            DiffMode::Strict => strict_diff(a, b),
            DiffMode::Tolerant => tolerant_diff(a, b, self.unordered),
        }
    }

    /// Run the configured engine and wrap the result in a report.
    pub fn report(&self, a: &Value, b: &Value) -> DiffReport {
        DiffReport::new(self.mode, self.compare(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapediff_value::Reflect;

    #[test]
    fn default_is_strict_and_ordered() {
        let config = DiffConfig::default();
        assert_eq!(config.mode, DiffMode::Strict);
        assert!(!config.unordered);
        assert_eq!(config, DiffConfig::strict());
    }

    #[test]
    fn mode_selects_engine() {
        let a = vec![1i64, 2].reflect();
        let b = vec![2i32, 1].reflect();
        assert_eq!(DiffConfig::strict().compare(&a, &b).len(), 1);
        assert_eq!(DiffConfig::tolerant().compare(&a, &b).len(), 2);
        assert!(DiffConfig::tolerant_unordered().compare(&a, &vec![2i64, 1].reflect()).is_empty());
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DiffConfig = serde_json::from_str(r#"{"mode": "tolerant"}"#).unwrap();
        assert_eq!(config, DiffConfig::tolerant());

        let json = serde_json::to_string(&DiffConfig::tolerant_unordered()).unwrap();
        assert_eq!(json, r#"{"mode":"tolerant","unordered":true}"#);
    }
}
