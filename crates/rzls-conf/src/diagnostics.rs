use std::collections::HashMap;

use serde::Deserialize;

/// Severity override for a descriptor diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Off,
    Error,
    Warning,
    Info,
    Hint,
}

/// Per-code severity overrides for tag helper diagnostics.
///
/// Codes not mentioned keep the severity the diagnostic was created with.
///
/// ```toml
/// [diagnostics.severity]
/// RZ3008 = "warning"
/// "RZ30" = "off"      # every RZ30xx code
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub severity: HashMap<String, DiagnosticSeverity>,
}

impl DiagnosticsConfig {
    /// Resolve the override for `code`.
    ///
    /// An exact entry wins, then the longest matching prefix. Codes compare
    /// ASCII-case-insensitively. `None` means no override applies.
    #[must_use]
    pub fn severity_for(&self, code: &str) -> Option<DiagnosticSeverity> {
        let code = code.to_ascii_uppercase();

        self.severity
            .iter()
            .map(|(pattern, severity)| (pattern.to_ascii_uppercase(), *severity))
            .filter(|(pattern, _)| code.starts_with(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, severity)| severity)
    }

    #[must_use]
    pub fn is_enabled(&self, code: &str) -> bool {
        self.severity_for(code) != Some(DiagnosticSeverity::Off)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(entries: &[(&str, DiagnosticSeverity)]) -> DiagnosticsConfig {
        DiagnosticsConfig {
            severity: entries
                .iter()
                .map(|(code, severity)| ((*code).to_string(), *severity))
                .collect(),
        }
    }

    #[test]
    fn test_no_override_by_default() {
        let config = DiagnosticsConfig::default();
        assert_eq!(config.severity_for("RZ3008"), None);
        assert!(config.is_enabled("RZ3008"));
    }

    #[test]
    fn test_longest_prefix_wins() {
        let config = config(&[
            ("RZ", DiagnosticSeverity::Warning),
            ("RZ30", DiagnosticSeverity::Off),
            ("RZ301", DiagnosticSeverity::Hint),
        ]);

        assert_eq!(config.severity_for("RZ3011"), Some(DiagnosticSeverity::Hint));
        assert_eq!(config.severity_for("RZ3008"), Some(DiagnosticSeverity::Off));
        assert_eq!(config.severity_for("RZ1000"), Some(DiagnosticSeverity::Warning));
    }

    #[test]
    fn test_exact_overrides_prefix() {
        let config = config(&[
            ("RZ30", DiagnosticSeverity::Off),
            ("RZ3009", DiagnosticSeverity::Error),
        ]);

        assert!(config.is_enabled("RZ3009"));
        assert!(!config.is_enabled("RZ3010"));
    }

    #[test]
    fn test_codes_ignore_case() {
        let config = config(&[("rz3008", DiagnosticSeverity::Warning)]);
        assert_eq!(config.severity_for("RZ3008"), Some(DiagnosticSeverity::Warning));
    }

    #[test]
    fn test_deserialize_diagnostics_config() {
        let toml = r#"
            [severity]
            RZ3008 = "off"
            "RZ30" = "warning"
        "#;

        let config: DiagnosticsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.severity.get("RZ3008"), Some(&DiagnosticSeverity::Off));
        assert_eq!(config.severity.get("RZ30"), Some(&DiagnosticSeverity::Warning));
    }
}
