//! The threat catalog a report is generated from.

use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Something a threat acts upon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactObject {
    pub id: String,
    pub name: String,
    /// The object's category, stored as `type` in the catalog
    #[serde(
        rename = "type",
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
}

/// A way a threat can be carried out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub id: String,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub risk_level: Option<String>,
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Threat {
    #[serde(
        default,
        deserialize_with = "non_empty",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    pub objects: Vec<ImpactObject>,
    pub implementations: Vec<Implementation>,
}

/// Every known threat keyed by its identifier, e.g. `"1.12"`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    threats: BTreeMap<String, Threat>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from its JSON form, an object mapping threat ids to records
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        log::debug!("loaded catalog with {} threats", catalog.len());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let catalog: Catalog = serde_json::from_reader(reader)?;
        log::debug!("loaded catalog with {} threats", catalog.len());
        Ok(catalog)
    }

    pub fn insert<S: Into<String>>(&mut self, id: S, threat: Threat) {
        self.threats.insert(id.into(), threat);
    }

    pub fn get(&self, id: &str) -> Option<&Threat> {
        self.threats.get(id)
    }

    pub fn len(&self) -> usize {
        self.threats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threats.is_empty()
    }

    /// Threat ids in listing order: by the number after the first `.`, so that
    /// `1.2` comes before `1.10`. Ids without such a number go last.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.threats.keys().map(String::as_str).collect();
        ids.sort_by_key(|id| {
            let number = id
                .split('.')
                .nth(1)
                .and_then(|part| part.trim().parse::<u64>().ok());
            (number.is_none(), number, *id)
        });
        ids
    }
}

impl ImpactObject {
    /// Case-insensitive match of `needle` (already lowercased) against id, name and type
    pub fn matches(&self, needle: &str) -> bool {
        contains(&self.id, needle)
            || contains(&self.name, needle)
            || self.kind.as_deref().is_some_and(|kind| contains(kind, needle))
    }
}

impl Implementation {
    /// Case-insensitive match of `needle` (already lowercased) against id, name,
    /// category and risk level
    pub fn matches(&self, needle: &str) -> bool {
        contains(&self.id, needle)
            || contains(&self.name, needle)
            || self.category.as_deref().is_some_and(|c| contains(c, needle))
            || self.risk_level.as_deref().is_some_and(|r| contains(r, needle))
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Optional text fields treat `""` the same as a missing value
fn non_empty<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
