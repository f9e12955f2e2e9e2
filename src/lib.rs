//! # formsmith - dynamic form configuration toolkit
//!
//! A declarative schema for form fields (data sources, validation, layout and
//! cross-field events) plus a service that asks an LLM to turn a free-text
//! description into event, validation and component-config fragments.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use formsmith::config::Settings;
//! use formsmith::generator::{EventGeneratorService, GenerationRequest};
//! use formsmith::llm::ChatCompletionsProvider;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let provider = Arc::new(ChatCompletionsProvider::new(&settings.llm)?);
//!     let service = EventGeneratorService::new(provider, settings.generation.clone())?;
//!
//!     let form = formsmith::adapters::sample_forms::SampleForm::Product.load()?;
//!     let request = GenerationRequest::for_form(
//!         &form,
//!         &["productId".to_string()],
//!         "fill in the price when a product is selected",
//!     )?;
//!     let fragments = service.generate(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&fragments)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Layout
//!
//! - **domain**: the form schema, pure data
//! - **catalog**: named remote-lookup definitions
//! - **generator**: prompts, parsing, validation and fallbacks of the pipeline
//! - **llm**: the provider trait and a chat-completions client
//! - **adapters**: dictionary service client and bundled sample forms
//! - **config**: layered settings and structural validation

pub mod adapters;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod generator;
pub mod llm;
