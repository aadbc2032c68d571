pub mod diagnostics;

use camino::Utf8Path;
use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

pub use crate::diagnostics::DiagnosticSeverity;
pub use crate::diagnostics::DiagnosticsConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Invalid tag helper prefix {0:?}: prefixes may not contain whitespace, '<', '>' or '/'")]
    InvalidPrefix(String),
}

/// Platform directories for user configuration, logs and caches.
#[must_use]
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "rzls", "rzls")
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub log_dir: Option<Utf8PathBuf>,
    pub completion: CompletionSettings,
    pub tag_helpers: TagHelperSettings,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompletionSettings {
    /// Whether a space commits an element completion in addition to `>`.
    pub commit_elements_with_space: bool,
    pub check_attribute_rules: bool,
    pub host: CompletionHost,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            commit_elements_with_space: true,
            check_attribute_rules: true,
            host: CompletionHost::default(),
        }
    }
}

/// Which editor host the completion engine answers for.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompletionHost {
    #[default]
    Lsp,
    Legacy,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TagHelperSettings {
    /// Prefix applied to documents that declare no `@tagHelperPrefix`.
    pub prefix: Option<String>,
}

impl Settings {
    pub fn new(project_root: &Utf8Path) -> Result<Self, ConfigError> {
        let user_config_file = project_dirs()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().join("rzls.toml")).ok());

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Utf8Path,
        user_config_path: Option<&Utf8Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        for name in [".rzls.toml", "rzls.toml"] {
            let path = project_root.join(name);
            if path.exists() {
                tracing::debug!("Loading project settings from {path}");
            }
            builder = builder.add_source(
                File::from(path.as_std_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.tag_helpers.prefix {
            if prefix
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '/'))
            {
                return Err(ConfigError::InvalidPrefix(prefix.clone()));
            }
        }
        Ok(())
    }

    /// Default log directory: the platform cache dir, else the temp dir.
    #[must_use]
    pub fn resolved_log_dir(&self) -> Utf8PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }

        project_dirs()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.cache_dir().to_path_buf()).ok())
            .or_else(|| Utf8PathBuf::from_path_buf(std::env::temp_dir()).ok())
            .unwrap_or_else(|| Utf8PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;
    use tempfile::TempDir;

    use super::*;

    fn root(dir: &TempDir) -> &Utf8Path {
        Utf8Path::from_path(dir.path()).unwrap()
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::load_from_paths(root(&dir), None).unwrap();
            assert_eq!(settings, Settings::default());
            assert!(settings.completion.commit_elements_with_space);
            assert!(settings.completion.check_attribute_rules);
            assert_eq!(settings.completion.host, CompletionHost::Lsp);
            assert_eq!(settings.tag_helpers.prefix, None);
        }

        #[test]
        fn test_explicit_log_dir_is_used() {
            let settings = Settings {
                log_dir: Some(Utf8PathBuf::from("/var/log/rzls")),
                ..Settings::default()
            };
            assert_eq!(settings.resolved_log_dir(), Utf8PathBuf::from("/var/log/rzls"));
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_rzls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("rzls.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(root(&dir), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_load_dot_rzls_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".rzls.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(root(&dir), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_load_sections() {
            let dir = tempdir().unwrap();
            let content = r#"
[completion]
commit_elements_with_space = false
host = "legacy"

[tag_helpers]
prefix = "th:"
"#;
            fs::write(dir.path().join("rzls.toml"), content).unwrap();
            let settings = Settings::load_from_paths(root(&dir), None).unwrap();

            assert!(!settings.completion.commit_elements_with_space);
            assert!(settings.completion.check_attribute_rules);
            assert_eq!(settings.completion.host, CompletionHost::Legacy);
            assert_eq!(settings.tag_helpers.prefix.as_deref(), Some("th:"));
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_project_priority_rzls_overrides_dot_rzls() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".rzls.toml"), "debug = false").unwrap();
            fs::write(dir.path().join("rzls.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(root(&dir), None).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_user_priority_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = root(&user_dir).join("rzls.toml");
            fs::write(&user_conf_path, "debug = true").unwrap();
            fs::write(project_dir.path().join(".rzls.toml"), "debug = false").unwrap();

            let settings =
                Settings::load_from_paths(root(&project_dir), Some(&user_conf_path)).unwrap();
            assert!(!settings.debug);
        }

        #[test]
        fn test_user_and_project_tables_merge() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = root(&user_dir).join("rzls.toml");
            fs::write(&user_conf_path, "[completion]\nhost = \"legacy\"\n").unwrap();
            fs::write(
                project_dir.path().join("rzls.toml"),
                "[completion]\ncheck_attribute_rules = false\n",
            )
            .unwrap();

            let settings =
                Settings::load_from_paths(root(&project_dir), Some(&user_conf_path)).unwrap();
            assert_eq!(settings.completion.host, CompletionHost::Legacy);
            assert!(!settings.completion.check_attribute_rules);
        }
    }

    mod user_config {
        use super::*;

        #[test]
        fn test_load_user_config_only() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = root(&user_dir).join("rzls.toml");
            fs::write(&user_conf_path, "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(root(&project_dir), Some(&user_conf_path)).unwrap();
            assert!(settings.debug);
        }

        #[test]
        fn test_no_user_config_file_present() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = root(&user_dir).join("rzls.toml");
            fs::write(project_dir.path().join("rzls.toml"), "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(root(&project_dir), Some(&user_conf_path)).unwrap();
            assert!(settings.debug);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("rzls.toml"), "debug = not_a_boolean").unwrap();
            let result = Settings::load_from_paths(root(&dir), None);
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }

        #[test]
        fn test_invalid_prefix() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("rzls.toml"),
                "[tag_helpers]\nprefix = \"th <\"\n",
            )
            .unwrap();
            let result = Settings::load_from_paths(root(&dir), None);
            assert!(matches!(result.unwrap_err(), ConfigError::InvalidPrefix(_)));
        }
    }
}
