//! Sample form configurations bundled into the binary

use rust_embed::RustEmbed;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::FormConfig;

#[derive(RustEmbed)]
#[folder = "samples/"]
struct SampleAssets;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Unknown sample form: {0}")]
    NotFound(String),

    #[error("Sample form {name} is invalid: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleForm {
    /// Product selection that fills code, name and price
    Product,
    /// User profile with a validated email field
    User,
    /// Order whose customer selection fills contact details
    Order,
}

impl SampleForm {
    pub const ALL: [SampleForm; 3] = [SampleForm::Product, SampleForm::User, SampleForm::Order];

    pub fn name(&self) -> &'static str {
        match self {
            SampleForm::Product => "product",
            SampleForm::User => "user",
            SampleForm::Order => "order",
        }
    }

    fn file_name(&self) -> String {
        format!("{}.yaml", self.name())
    }

    pub fn load(&self) -> Result<FormConfig, SampleError> {
        let file = SampleAssets::get(&self.file_name())
            .ok_or_else(|| SampleError::NotFound(self.name().to_string()))?;
        serde_yaml::from_slice(&file.data).map_err(|source| SampleError::Parse {
            name: self.name().to_string(),
            source,
        })
    }
}

impl fmt::Display for SampleForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleForm {
    type Err = SampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SampleForm::ALL
            .into_iter()
            .find(|sample| sample.name() == s)
            .ok_or_else(|| SampleError::NotFound(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValidator;
    use crate::domain::{DataSource, EventType, FieldType};

    #[test]
    fn test_every_sample_loads_and_validates() {
        for sample in SampleForm::ALL {
            let form = sample.load().unwrap();
            assert!(!form.fields.is_empty(), "{} has no fields", sample);
            assert!(
                ConfigValidator::validate_form(&form).is_ok(),
                "{} failed validation",
                sample
            );
        }
    }

    #[test]
    fn test_product_sample_links_fields() {
        let form = SampleForm::Product.load().unwrap();
        assert_eq!(form.fields.len(), 9);

        let product = form.field("productId").unwrap();
        assert_eq!(product.field_type, FieldType::Select);
        let Some(DataSource::Static(source)) = &product.data_source else {
            panic!("productId should have a static source");
        };
        assert_eq!(source.options[0].extra["drawcode"], "NB-001");

        let event = &product.events[0];
        assert_eq!(event.event_type, EventType::Change);
        assert_eq!(event.actions.len(), 3);
        assert_eq!(product.component_config.as_ref().unwrap().filterable(), Some(true));
    }

    #[test]
    fn test_user_sample_has_email_rule() {
        let form = SampleForm::User.load().unwrap();
        let email = form.field("email").unwrap();
        assert!(email.validation_rules()[0].pattern.is_some());
    }

    #[test]
    fn test_parse_sample_name() {
        assert_eq!("order".parse::<SampleForm>().unwrap(), SampleForm::Order);
        assert!(matches!(
            "invoice".parse::<SampleForm>(),
            Err(SampleError::NotFound(_))
        ));
    }
}
