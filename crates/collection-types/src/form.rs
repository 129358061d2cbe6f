//! Collection form state.

use serde::{Deserialize, Serialize};

use crate::FormError;

/// User-editable collection details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    /// Carried with the form but not read at submit time.
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Editable text fields of [`CollectionForm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Symbol,
    Description,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Description => "description",
        }
    }
}

impl CollectionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a single field, leaving the others untouched.
    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Name => self.name = value,
            FormField::Symbol => self.symbol = value,
            FormField::Description => self.description = value,
        }
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Symbol => &self.symbol,
            FormField::Description => &self.description,
        }
    }

    /// All text fields are required and must contain non-whitespace.
    pub fn validate(&self) -> Result<(), FormError> {
        for field in [FormField::Name, FormField::Symbol, FormField::Description] {
            if self.get(field).trim().is_empty() {
                return Err(FormError::MissingField(field.as_str()));
            }
        }
        Ok(())
    }

    /// Caption for the image at `index`, numbered from 1.
    pub fn item_name(&self, index: usize) -> String {
        format!("{} #{}", self.name, index + 1)
    }
}
