use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, new_id};
use crate::{Result, validate};

/// Grouping for tests ("Anxiety", "Personality", ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Document id.
    pub id: String,
    /// Display name, unique case-insensitively.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Document for Category {
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Category {
    /// Create a validated category.
    pub fn new(name: &str, description: Option<String>) -> Result<Self> {
        Ok(Self {
            id: new_id(),
            name: validate::non_blank("name", name)?,
            description: validate::optional_text(description),
            created_at: Utc::now(),
        })
    }

    /// Replace name and description.
    pub fn update(&mut self, name: &str, description: Option<String>) -> Result<()> {
        self.name = validate::non_blank("name", name)?;
        self.description = validate::optional_text(description);
        Ok(())
    }

    /// Case-insensitive name comparison used for uniqueness.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}
