//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::expand_paths(&mut config);
        Ok(config)
    }

    fn expand_paths(config: &mut Config) {
        let dirs = [
            &mut config.storage.data_dir,
            &mut config.storage.snapshot_dir,
            &mut config.engine.forms_dir,
            &mut config.browser.profile_dir,
        ];
        for dir in dirs {
            if let Some(path) = dir.as_mut() {
                *path = PathBuf::from(Self::expand_path(&path.to_string_lossy()));
            }
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

        let mut result = content.to_string();
        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::MissingEnv(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    /// Expand shell-style paths (e.g., `~/.gramasathi`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.engine.settle_ms, 2000);
    }

    #[test]
    fn test_load_server_and_browser() {
        let content = r#"
            [server]
            host = "0.0.0.0"
            port = 4000

            [browser]
            debug_port = 9333
            headless = false
            max_contexts = 8
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.browser.debug_port, 9333);
        assert!(!config.browser.headless);
        assert_eq!(config.browser.max_contexts, 8);
        assert_eq!(config.browser.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_load_keywords_preserve_order() {
        let content = r#"
            [[heuristics.keywords]]
            keyword = "mobile"
            field = "phone"

            [[heuristics.keywords]]
            keyword = "pin"
            field = "pincode"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        let keywords = &config.heuristics.keywords;
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].keyword, "mobile");
        assert_eq!(keywords[1].field, "pincode");
    }

    #[test]
    fn test_load_registry_replaces_defaults() {
        let content = r##"
            [registry."https://panchayat.example/grievance"]
            name = "#applicant"
            submit = "#send"
        "##;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.registry.len(), 1);
        let form = &config.registry["https://panchayat.example/grievance"];
        assert_eq!(form["name"], "#applicant");
        assert_eq!(form["submit"], "#send");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[engine]").unwrap();
        writeln!(file, "locator_timeout_ms = 500").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.engine.locator_timeout_ms, 500);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/gramasathi.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/gramasathi.toml")).unwrap();
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_invalid_toml() {
        let result = ConfigLoader::load_str("invalid = [unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("GRAMASATHI_TEST_CONFIG_VAR", "9444");
        }
        let content = "[browser]\ndebug_port = ${GRAMASATHI_TEST_CONFIG_VAR}";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.browser.debug_port, 9444);
        unsafe {
            std::env::remove_var("GRAMASATHI_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_GRAMASATHI_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::MissingEnv(_))));
    }

    #[test]
    fn test_load_expands_tilde_dirs() {
        let content = "[storage]\ndata_dir = \"~/gs-data\"\n[engine]\nforms_dir = \"/srv/forms\"";
        let config = ConfigLoader::load_str(content).unwrap();
        let data_dir = config.storage.data_dir();
        assert!(!data_dir.starts_with("~"));
        assert!(data_dir.ends_with("gs-data"));
        assert_eq!(config.engine.forms_dir(), PathBuf::from("/srv/forms"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/forms");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/forms"));
    }

    #[test]
    fn test_expand_path_no_tilde() {
        assert_eq!(ConfigLoader::expand_path("/srv/forms"), "/srv/forms");
    }
}
