use crate::error::{Result, WatchError};
use colored::Colorize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Flags configuration keys that path-watcher does not understand
pub struct ConfigValidator {
    /// Set of valid configuration fields
    known_fields: HashSet<String>,
    /// Flat keys from the older single-table layout, mapped to their replacement
    legacy_fields: HashMap<String, &'static str>,
}

impl ConfigValidator {
    /// Create a new validator with known configuration fields
    #[must_use]
    pub fn new() -> Self {
        let mut known_fields = HashSet::new();
        let mut legacy_fields = HashMap::new();

        known_fields.insert("watch.path".to_string());
        known_fields.insert("watch.paths".to_string());
        known_fields.insert("watch.recursive".to_string());

        known_fields.insert("output.path".to_string());

        known_fields.insert("log.path".to_string());
        known_fields.insert("log.level".to_string());

        legacy_fields.insert("path".to_string(), "[watch] path");
        legacy_fields.insert("recursive".to_string(), "[watch] recursive");
        legacy_fields.insert("log_level".to_string(), "[log] level");
        legacy_fields.insert("output_file".to_string(), "[output] path");
        legacy_fields.insert("log_file".to_string(), "[log] path");

        Self {
            known_fields,
            legacy_fields,
        }
    }

    /// Validate a configuration file and print warnings to stderr
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub fn validate_config_file(&self, config_path: &Path) -> Result<()> {
        if !config_path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            WatchError::config(format!(
                "Failed to read configuration file {}: {e}",
                config_path.display()
            ))
        })?;
        let warnings = self.collect_warnings(&content)?;

        if !warnings.is_empty() {
            eprintln!("{}", "Configuration warnings:".yellow().bold());
            for warning in warnings {
                eprintln!("  {warning}");
            }
            eprintln!();
        }

        Ok(())
    }

    /// Collect warnings for unknown and legacy keys in TOML source
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid TOML
    pub fn collect_warnings(&self, content: &str) -> Result<Vec<String>> {
        let parsed: toml::Value = toml::from_str(content)
            .map_err(|e| WatchError::config(format!("Failed to parse TOML config: {e}")))?;

        let mut unknown_fields = Vec::new();
        let mut legacy_used = Vec::new();
        self.check_table(&parsed, "", &mut unknown_fields, &mut legacy_used);

        let mut warnings = Vec::new();
        for field in &unknown_fields {
            warnings.push(format!("Unknown configuration field: {}", field.yellow()));
        }
        for field in &legacy_used {
            let replacement = self.legacy_fields.get(field).copied().unwrap_or("a section");
            warnings.push(format!(
                "Legacy field '{}': {}",
                field.yellow(),
                format!("move it to {replacement}").dimmed()
            ));
        }

        Ok(warnings)
    }

    /// Recursively checks a TOML table for unknown and legacy fields
    fn check_table(
        &self,
        table: &toml::Value,
        prefix: &str,
        unknown: &mut Vec<String>,
        legacy: &mut Vec<String>,
    ) {
        if let toml::Value::Table(map) = table {
            for (key, value) in map {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };

                if prefix.is_empty() && self.legacy_fields.contains_key(&full_key) {
                    legacy.push(full_key);
                    continue;
                }

                if self.known_fields.contains(&full_key) {
                    continue;
                }

                if let toml::Value::Table(_) = value {
                    self.check_table(value, &full_key, unknown, legacy);
                } else {
                    unknown.push(full_key);
                }
            }
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_fields_produce_no_warnings() {
        let content = r#"
[watch]
paths = ["/a"]
recursive = true

[output]
path = "out.txt"

[log]
level = "debug"
"#;
        let warnings = ConfigValidator::new().collect_warnings(content).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let content = "[watch]\npath = \"/a\"\ndebounce_ms = 100\n";
        let warnings = ConfigValidator::new().collect_warnings(content).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("watch.debounce_ms"));
    }

    #[test]
    fn test_legacy_flat_layout_is_reported() {
        let content = "path = \"/a\"\nlog_level = \"info\"\n";
        let warnings = ConfigValidator::new().collect_warnings(content).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("[watch] path")));
        assert!(warnings.iter().any(|w| w.contains("[log] level")));
    }
}
