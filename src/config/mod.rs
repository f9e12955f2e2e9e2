use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod validator;

pub use validator::{ConfigValidator, ValidationError};

use crate::adapters::dictionary_client::DictionaryConfig;
use crate::catalog::{CatalogEntry, DataSourceCatalog};
use crate::cli::Cli;
use crate::generator::GenerationSettings;
use crate::llm::LlmConfig;

/// Prefix of environment overrides, e.g. `FORMSMITH__LLM__MODEL`
pub const ENV_PREFIX: &str = "FORMSMITH";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub dictionary: DictionaryConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
    /// Catalog entries appended after the built-in ones
    #[serde(default)]
    pub data_sources: Vec<CatalogEntry>,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, env vars, then CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let root = cli
            .config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut settings = Self::load(cli.config.clone(), None)?;

        // CLI > env vars > config file
        settings.apply_cli_overrides(cli);
        settings.load_external_configs(root)?;
        settings.check()?;

        Ok(settings)
    }

    /// Load `<root>/formsmith.{toml,yaml,json}` plus `<root>/config/data_sources/`
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        Self::from_root_with_env(root, None)
    }

    /// `from_root` reading `FORMSMITH__*` overrides from `env` instead of the
    /// process environment when it is given
    pub fn from_root_with_env(
        root: impl AsRef<Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, anyhow::Error> {
        let root = root.as_ref();
        let mut settings = Self::load(root.join("formsmith"), env)?;
        settings.load_external_configs(root)?;
        settings.check()?;
        Ok(settings)
    }

    fn load(config_path: PathBuf, env: Option<Map<String, String>>) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .source(env),
            )
            .build()?;
        Ok(s.try_deserialize()?)
    }

    fn check(&self) -> Result<(), anyhow::Error> {
        ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.llm_endpoint {
            self.llm.endpoint = endpoint.clone();
        }
        if let Some(model) = &cli.llm_model {
            self.llm.model = model.clone();
        }
        if let Some(url) = &cli.dictionary_url {
            self.dictionary.base_url = url.clone();
        }
    }

    fn load_external_configs(&mut self, root: &Path) -> Result<(), anyhow::Error> {
        self.load_data_sources_from_dir(&root.join("config").join("data_sources"))
    }

    fn load_data_sources_from_dir(&mut self, dir: &Path) -> Result<(), anyhow::Error> {
        let pattern = format!("{}/*", dir.display());
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => tracing::warn!("Failed to read glob entry: {}", e),
            }
        }
        paths.sort();

        for path in paths {
            let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let content = match ext {
                "json" | "yaml" | "yml" | "toml" => std::fs::read_to_string(&path)?,
                _ => continue,
            };
            let entry: CatalogEntry = match ext {
                "json" => serde_json::from_str(&content)?,
                "toml" => toml::from_str(&content)?,
                _ => serde_yaml::from_str(&content)?,
            };
            tracing::debug!(id = %entry.id, path = %path.display(), "Loaded data source");
            self.data_sources.push(entry);
        }
        Ok(())
    }

    /// Built-in catalog followed by the configured entries
    pub fn catalog(&self) -> DataSourceCatalog {
        DataSourceCatalog::with_entries(self.data_sources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FragmentPolicy;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::from_root(dir.path()).unwrap();
        assert_eq!(settings.llm.temperature, 0.1);
        assert_eq!(settings.llm.max_tokens, 2000);
        assert_eq!(settings.generation.policy.event, FragmentPolicy::Fail);
        assert_eq!(settings.catalog().list_available().len(), 4);
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[llm]
model = "from-file"

[dictionary]
base_url = "http://dict.internal/common"
"#,
        )
        .unwrap();

        let cli = Cli::parse_from([
            "formsmith",
            "--config",
            path.to_str().unwrap(),
            "--llm-model",
            "from-cli",
            "catalog",
            "list",
        ]);
        let settings = Settings::new_with_cli(&cli).unwrap();
        assert_eq!(settings.llm.model, "from-cli");
        assert_eq!(settings.dictionary.base_url, "http://dict.internal/common");
    }
}
