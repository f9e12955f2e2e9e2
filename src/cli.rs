use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::adapters::sample_forms::SampleForm;
use crate::domain::{AnalysisCategory, FormConfig};

/// Form configuration toolkit with LLM-assisted event generation
#[derive(Parser, Debug, Clone)]
#[command(name = "formsmith", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "FORMSMITH_CONFIG", default_value = "formsmith.toml")]
    pub config: PathBuf,

    /// Chat-completions endpoint URL
    #[arg(long, env = "FORMSMITH_LLM_ENDPOINT", global = true)]
    pub llm_endpoint: Option<String>,

    /// Model name sent with every completion request
    #[arg(long, env = "FORMSMITH_LLM_MODEL", global = true)]
    pub llm_model: Option<String>,

    /// Base URL of the dictionary service
    #[arg(long, env = "FORMSMITH_DICTIONARY_URL", global = true)]
    pub dictionary_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Inspect the data source catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogCommand,
    },
    /// Query the dictionary service
    Dict {
        #[command(subcommand)]
        action: DictCommand,
    },
    /// Print a bundled sample form
    Sample {
        /// product, user or order
        name: SampleForm,
    },
    /// Check a form file for structural problems
    CheckForm {
        path: PathBuf,
    },
    /// Validate an event against a form
    ValidateEvent {
        /// Sample name or form file
        #[arg(long)]
        form: String,
        /// Event file (JSON, YAML or TOML)
        #[arg(long)]
        event: PathBuf,
    },
    /// Generate configuration fragments from a description
    Generate {
        /// Sample name or form file
        #[arg(long)]
        form: String,
        /// Comma-separated names of the selected fields
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        #[arg(short, long)]
        description: String,
        /// Categories to analyse; defaults come from the configuration
        #[arg(long = "category", value_delimiter = ',')]
        categories: Vec<AnalysisCategory>,
        /// Also produce a plain-language summary of the event
        #[arg(long)]
        describe: bool,
        /// Generate the event in a single completion
        #[arg(long, conflicts_with_all = ["categories", "describe"])]
        direct: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CatalogCommand {
    /// List entry ids and names
    List,
    /// Show one entry and its data source
    Show { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum DictCommand {
    /// List dictionary types
    Types { keyword: Option<String> },
    /// List the entries of a dictionary type
    Data { keyword: String },
    /// Print the data source for a dictionary type
    Source {
        #[arg(value_name = "TYPE")]
        dict_type: String,
        name: String,
    },
    /// Print a JavaScript function that fetches a dictionary type
    Snippet {
        #[arg(value_name = "TYPE")]
        dict_type: String,
    },
}

/// Read a JSON, YAML or TOML document, picking the format by extension
pub fn load_document<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let parsed = match ext {
        "json" => serde_json::from_str(&content).map_err(anyhow::Error::from),
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(anyhow::Error::from),
        "toml" => toml::from_str(&content).map_err(anyhow::Error::from),
        other => Err(anyhow::anyhow!("Unsupported file extension: {:?}", other)),
    };
    parsed.with_context(|| format!("Failed to parse {}", path.display()))
}

/// A bundled sample when `name` matches one, otherwise a form file
pub fn load_form(name: &str) -> anyhow::Result<FormConfig> {
    match name.parse::<SampleForm>() {
        Ok(sample) => Ok(sample.load()?),
        Err(_) => load_document(Path::new(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["formsmith", "catalog", "list"]);
        assert_eq!(cli.config, PathBuf::from("formsmith.toml"));
        assert!(cli.llm_endpoint.is_none());
        assert!(matches!(
            cli.command,
            Command::Catalog {
                action: CatalogCommand::List
            }
        ));
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::parse_from([
            "formsmith",
            "generate",
            "--form",
            "product",
            "--fields",
            "productId,price",
            "--description",
            "fill the price when a product is picked",
            "--category",
            "event,validation",
            "--llm-model",
            "test-model",
        ]);
        assert_eq!(cli.llm_model.as_deref(), Some("test-model"));
        let Command::Generate {
            fields,
            categories,
            describe,
            direct,
            ..
        } = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(fields, vec!["productId", "price"]);
        assert_eq!(
            categories,
            vec![AnalysisCategory::Event, AnalysisCategory::Validation]
        );
        assert!(!describe);
        assert!(!direct);
    }

    #[test]
    fn test_dict_snippet_args() {
        let cli = Cli::parse_from(["formsmith", "dict", "snippet", "region"]);
        assert!(matches!(
            cli.command,
            Command::Dict {
                action: DictCommand::Snippet { ref dict_type }
            } if dict_type == "region"
        ));
    }

    #[test]
    fn test_unknown_sample_rejected() {
        assert!(Cli::try_parse_from(["formsmith", "sample", "invoice"]).is_err());
    }

    #[test]
    fn test_load_form_from_sample_and_file() {
        assert_eq!(load_form("user").unwrap().fields.len(), 6);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("form.json");
        fs::write(
            &path,
            r#"{"fields":[{"fieldName":"a","fieldType":"string","fieldLabel":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(load_form(path.to_str().unwrap()).unwrap().fields[0].field_name, "a");

        let bad = dir.path().join("form.txt");
        fs::write(&bad, "").unwrap();
        assert!(load_form(bad.to_str().unwrap()).is_err());
    }
}
