/// Catalog of illustrated entries and their localized labels
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SceneError, SceneResult};
use crate::scene::{AxisLabel, Category, SceneConfig};

pub const FALLBACK_LOCALE: &str = "en";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Raw scene JSON, parsed per entry so one bad scene cannot sink the
    /// whole catalog.
    #[serde(default)]
    pub scene: Value,
    /// Labels keyed by BCP 47 locale tag.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, LabelSet>,
}

/// Text overlaid on a scene for one locale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub axis: Vec<AxisLabel>,
}

impl Catalog {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        let mut seen = std::collections::HashSet::new();
        for entry in &catalog.entries {
            if entry.id.trim().is_empty() {
                return Err(SceneError::catalog("entry with an empty id"));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(SceneError::catalog(format!("duplicate entry id `{}`", entry.id)));
            }
        }
        tracing::debug!(entries = catalog.entries.len(), "parsed catalog");
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

impl CatalogEntry {
    /// Label set for `locale`: exact tag, then its language, then English.
    pub fn labels_for(&self, locale: &str) -> Option<&LabelSet> {
        let language = locale.split(['-', '_']).next().unwrap_or(locale);
        self.labels
            .get(locale)
            .or_else(|| self.labels.get(language))
            .or_else(|| self.labels.get(FALLBACK_LOCALE))
    }

    /// The entry's scene exactly as authored.
    pub fn scene(&self) -> SceneResult<SceneConfig> {
        SceneConfig::deserialize(&self.scene)
            .map_err(|err| SceneError::catalog(format!("entry `{}`: {err}", self.id)))
    }

    /// The scene as shown under this entry's category, with localized labels.
    pub fn scene_for(&self, locale: &str) -> SceneResult<SceneConfig> {
        let scene = self.scene()?;
        let mut scene = match self.category {
            Some(category) => scene.adapt(category),
            None => scene,
        };
        let Some(labels) = self.labels_for(locale) else {
            return Ok(scene);
        };
        match &mut scene {
            SceneConfig::Cube(cube) => {
                if labels.front.is_some() {
                    cube.render.front_label = labels.front.clone();
                }
            }
            SceneConfig::TimeAxis(axis) => {
                if !labels.axis.is_empty() {
                    axis.labels = labels.axis.clone();
                }
            }
        }
        Ok(scene)
    }
}
