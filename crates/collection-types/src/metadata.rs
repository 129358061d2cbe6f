//! Metadata documents pinned alongside the images.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::CollectionForm;

/// Per-token metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub attributes: Vec<Value>,
}

impl TokenMetadata {
    /// Metadata for the image at `index` (zero-based) pinned at `image_uri`.
    pub fn for_item(form: &CollectionForm, index: usize, image_uri: &str) -> Self {
        Self {
            name: form.item_name(index),
            description: form.description.clone(),
            image: image_uri.to_string(),
            attributes: Vec::new(),
        }
    }
}

/// Collection-level metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    pub external_link: String,
}

impl CollectionMetadata {
    /// Uses the first image as the collection image. `None` when no image was pinned.
    pub fn from_form(form: &CollectionForm, image_uris: &[String]) -> Option<Self> {
        let image = image_uris.first()?.clone();
        Some(Self {
            name: form.name.clone(),
            description: form.description.clone(),
            image,
            external_link: String::new(),
        })
    }
}
