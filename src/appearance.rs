//! Appearance sets: named bundles of texture maps selectable by the user.

use crate::error::ConfigError;
use crate::resource::MapSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The texture-map URLs of one selectable surface finish.
///
/// `base`, `ao`, `norm` and `rough` are required; `height` and `metal` are optional
/// and are cleared from the material when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppearanceSet {
    pub base: String,
    pub ao: String,
    pub norm: String,
    pub rough: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metal: Option<String>,
}

impl AppearanceSet {
    /// The URL bound to `slot`, if any.
    pub fn url(&self, slot: MapSlot) -> Option<&str> {
        match slot {
            MapSlot::Base => Some(&self.base),
            MapSlot::Ao => Some(&self.ao),
            MapSlot::Normal => Some(&self.norm),
            MapSlot::Roughness => Some(&self.rough),
            MapSlot::Height => self.height.as_deref(),
            MapSlot::Metalness => self.metal.as_deref(),
        }
    }

    /// Every present slot with its URL, in slot order.
    pub fn urls(&self) -> impl Iterator<Item = (MapSlot, &str)> + '_ {
        MapSlot::ALL
            .iter()
            .filter_map(move |slot| self.url(*slot).map(|url| (*slot, url)))
    }

    /// The same set with its color map replaced, as selected by an option's
    /// `data-texture-base` attribute.
    pub fn with_base(&self, base: &str) -> Self {
        Self {
            base: base.to_string(),
            ..self.clone()
        }
    }
}

#[derive(Deserialize)]
struct CatalogEntry {
    id: String,
    #[serde(flatten)]
    set: AppearanceSet,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Map(BTreeMap<String, AppearanceSet>),
    List(Vec<CatalogEntry>),
}

/// The read-only table of appearance sets a viewer can switch between.
///
/// The catalog is handed to the viewer at construction time. It is usually parsed
/// from the static material configuration document, either keyed by set id:
///
/// ```
/// # use showroom::appearance::AppearanceCatalog;
/// let catalog = AppearanceCatalog::from_json(r#"{
///     "mat1": { "base": "mat1/base.jpg", "ao": "mat1/ao.jpg",
///               "norm": "mat1/norm.jpg", "rough": "mat1/rough.jpg" }
/// }"#).unwrap();
/// assert!(catalog.get("mat1").is_ok());
/// ```
///
/// or as a list of sets carrying an `id` field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppearanceCatalog {
    sets: BTreeMap<String, AppearanceSet>,
}

impl AppearanceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let sets = match serde_json::from_str::<CatalogDocument>(json)? {
            CatalogDocument::Map(sets) => sets,
            CatalogDocument::List(entries) => entries.into_iter().map(|e| (e.id, e.set)).collect(),
        };

        Ok(Self { sets })
    }

    /// Adds or replaces a set.
    pub fn insert(&mut self, id: &str, set: AppearanceSet) {
        let _ = self.sets.insert(id.to_string(), set);
    }

    /// Looks a set up by id.
    pub fn get(&self, id: &str) -> Result<&AppearanceSet, ConfigError> {
        self.sets
            .get(id)
            .ok_or_else(|| ConfigError::UnknownAppearanceSet(id.to_string()))
    }

    /// All set ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "mat1": {
            "base": "mat1/base.jpg", "ao": "mat1/ao.jpg", "norm": "mat1/norm.jpg",
            "rough": "mat1/rough.jpg", "height": "mat1/height.jpg"
        },
        "mat2": {
            "base": "mat2/base.jpg", "ao": "mat2/ao.jpg", "norm": "mat2/norm.jpg",
            "rough": "mat2/rough.jpg", "metal": "mat2/metal.jpg"
        }
    }"#;

    #[test]
    fn parses_keyed_catalog() {
        let catalog = AppearanceCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["mat1", "mat2"]);

        let mat1 = catalog.get("mat1").unwrap();
        assert_eq!(mat1.url(MapSlot::Height), Some("mat1/height.jpg"));
        assert_eq!(mat1.url(MapSlot::Metalness), None);
    }

    #[test]
    fn parses_list_catalog() {
        let catalog = AppearanceCatalog::from_json(
            r#"[{ "id": "linen", "base": "b.jpg", "ao": "a.jpg", "norm": "n.jpg", "rough": "r.jpg" }]"#,
        )
        .unwrap();
        assert_eq!(catalog.get("linen").unwrap().base, "b.jpg");
    }

    #[test]
    fn missing_required_map_is_rejected() {
        let result = AppearanceCatalog::from_json(r#"{ "bad": { "base": "b.jpg" } }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn unknown_set_is_reported() {
        let catalog = AppearanceCatalog::from_json(CATALOG).unwrap();
        assert!(matches!(
            catalog.get("mat9"),
            Err(ConfigError::UnknownAppearanceSet(id)) if id == "mat9"
        ));
    }

    #[test]
    fn urls_skip_absent_optional_slots() {
        let catalog = AppearanceCatalog::from_json(CATALOG).unwrap();
        let slots: Vec<_> = catalog.get("mat2").unwrap().urls().map(|(s, _)| s).collect();
        assert_eq!(
            slots,
            vec![MapSlot::Base, MapSlot::Ao, MapSlot::Normal, MapSlot::Roughness, MapSlot::Metalness]
        );
    }

    #[test]
    fn base_override_keeps_other_maps() {
        let catalog = AppearanceCatalog::from_json(CATALOG).unwrap();
        let set = catalog.get("mat1").unwrap().with_base("a.jpg");
        assert_eq!(set.base, "a.jpg");
        assert_eq!(set.ao, "mat1/ao.jpg");
    }
}
