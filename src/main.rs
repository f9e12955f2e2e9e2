use clap::Parser;
use formsmith::adapters::dictionary_client::{dictionary_catalog_entry, DictionaryClient, DEFAULT_TYPE_KEYWORD};
use formsmith::cli::{load_document, load_form, CatalogCommand, Cli, Command, DictCommand};
use formsmith::config::{ConfigValidator, Settings};
use formsmith::domain::{FieldEvent, FormConfig};
use formsmith::generator::{validate_event_config, EventGeneratorService, GenerationRequest};
use formsmith::llm::ChatCompletionsProvider;
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    match cli.command {
        Command::Catalog { action } => {
            let catalog = settings.catalog();
            match action {
                CatalogCommand::List => print_json(&catalog.list_available())?,
                CatalogCommand::Show { id } => {
                    let entry = catalog
                        .lookup(&id)
                        .ok_or_else(|| anyhow::anyhow!("No catalog entry named {}", id))?;
                    print_json(&serde_json::json!({
                        "entry": entry,
                        "dataSource": entry.data_source(),
                    }))?;
                }
            }
        }
        Command::Dict { action } => match action {
            DictCommand::Source { dict_type, name } => {
                print_json(&dictionary_catalog_entry(&settings.dictionary, &dict_type, &name).data_source())?
            }
            DictCommand::Snippet { dict_type } => {
                print!("{}", settings.dictionary.fetch_snippet(&dict_type))
            }
            DictCommand::Types { keyword } => {
                let client = DictionaryClient::new(settings.dictionary.clone())?;
                let keyword = keyword.as_deref().unwrap_or(DEFAULT_TYPE_KEYWORD);
                print_json(&client.fetch_types(keyword).await?)?;
            }
            DictCommand::Data { keyword } => {
                let client = DictionaryClient::new(settings.dictionary.clone())?;
                print_json(&client.fetch_data(&keyword).await?)?;
            }
        },
        Command::Sample { name } => print_json(&name.load()?)?,
        Command::CheckForm { path } => {
            let form: FormConfig = load_document(&path)?;
            match ConfigValidator::validate_form(&form) {
                Ok(()) => println!("{} is valid ({} fields)", path.display(), form.fields.len()),
                Err(errors) => {
                    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    anyhow::bail!("Form validation failed:\n{}", messages.join("\n"));
                }
            }
        }
        Command::ValidateEvent { form, event } => {
            let form = load_form(&form)?;
            let event: FieldEvent = load_document(&event)?;
            print_json(&validate_event_config(&event, &form.fields))?;
        }
        Command::Generate {
            form,
            fields,
            description,
            categories,
            describe,
            direct,
        } => {
            let form = load_form(&form)?;
            let provider = Arc::new(ChatCompletionsProvider::new(&settings.llm)?);
            let service = EventGeneratorService::new(provider, settings.generation.clone())?;

            let request = GenerationRequest::for_form(&form, &fields, description)?;
            if direct {
                print_json(&service.generate_event_direct(&request).await?)?;
            } else {
                let request = request
                    .with_categories(categories)
                    .with_description_summary(describe || settings.generation.describe_events);
                print_json(&service.generate(&request).await?)?;
            }
        }
    }

    Ok(())
}
