use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Final output: feature name -> ordered element identifiers.
///
/// Serializes as a flat JSON object, e.g.
/// `{"Game Board": ["draw_board", "reset_board"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMap {
    features: BTreeMap<String, Vec<String>>,
}

impl FeatureMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add members under `name`, appending to any members already there.
    /// A member already listed under `name` is not repeated.
    pub fn insert_members<I>(&mut self, name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = String>,
    {
        let entry = self.features.entry(name.into()).or_default();
        for member in members {
            if !entry.contains(&member) {
                entry.push(member);
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.features.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.features.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.keys().map(String::as_str)
    }

    /// Total member slots across features (counts overlap twice)
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.features.values().map(Vec::len).sum()
    }

    /// Write as pretty JSON (atomic: temp file + rename)
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        log::debug!("Saved {} features to {}", self.len(), path.display());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&data)?)
    }
}
