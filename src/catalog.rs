//! Read-only tag catalog and preset loading.

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::{Preset, Scope, SessionConfig, Tag, TagId, TagMode, UserMode};

/// Errors that can occur while loading the catalog or presets.
///
/// Any of these is fatal to session initialization.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog or preset file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The document is not a valid list of records.
    #[error("Invalid catalog JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Two records share the same id.
    #[error("Duplicate tag id in catalog: {0}")]
    DuplicateId(TagId),

    /// Two presets share the same id.
    #[error("Duplicate preset id: {0}")]
    DuplicatePreset(String),
}

/// Returns true if `tag` is visible and selectable under `config`.
///
/// A tag is eligible when its mode is `both` or the user's current mode,
/// and its scope is compatible with the session scope (either side being
/// `both` always matches). Hidden tags are never eligible.
///
/// Every consumer filters through this one predicate.
pub fn is_eligible(tag: &Tag, config: &SessionConfig) -> bool {
    let mode_ok = match tag.mode() {
        TagMode::Hidden => return false,
        TagMode::Both => true,
        TagMode::Simple => config.mode == UserMode::Simple,
        TagMode::Pro => config.mode == UserMode::Pro,
    };
    let scope_ok =
        config.scope == Scope::Both || tag.scope() == Scope::Both || tag.scope() == config.scope;

    mode_ok && scope_ok
}

/// The full set of tags, loaded once and never modified.
///
/// Iteration follows catalog order, which is also the tie-breaker wherever
/// tags of equal weight are ranked.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tags: Vec<Tag>,
    index: HashMap<TagId, usize>,
}

impl Catalog {
    /// Builds a catalog from records, rejecting duplicate ids.
    ///
    /// # Examples
    ///
    /// ```
    /// use judq::{Catalog, TagBuilder};
    ///
    /// let catalog = Catalog::from_tags(vec![
    ///     TagBuilder::new("fracture").legal_core("骨折").build(),
    ///     TagBuilder::new("contusion").legal_core("挫傷").build(),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(catalog.len(), 2);
    /// assert_eq!(catalog.position("contusion"), Some(1));
    /// ```
    pub fn from_tags(tags: Vec<Tag>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(tags.len());
        for (position, tag) in tags.iter().enumerate() {
            if index.insert(tag.id().clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(tag.id().clone()));
            }
        }

        Ok(Self { tags, index })
    }

    /// Parses a catalog from a JSON array of tag records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let tags: Vec<Tag> = serde_json::from_str(json).map_err(CatalogError::Parse)?;
        Self::from_tags(tags)
    }

    /// Loads a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let json = read_file(path)?;
        let catalog = Self::from_json(&json)?;
        info!(path = %path.display(), tags = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.index.get(id).map(|&position| &self.tags[position])
    }

    /// Returns the catalog position of a tag.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Iterates tags in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter()
    }

    /// Iterates tags eligible under `config`, in catalog order.
    pub fn eligible<'a>(&'a self, config: &SessionConfig) -> impl Iterator<Item = &'a Tag> {
        self.tags.iter().filter(move |tag| is_eligible(tag, config))
    }

    /// Resolves ids to tags in the given order, skipping unknown ids.
    pub fn resolve<'a>(&'a self, ids: &[TagId]) -> impl Iterator<Item = &'a Tag> {
        ids.iter().filter_map(|id| self.get(id.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parses presets from a JSON array of preset records.
pub fn presets_from_json(json: &str) -> Result<Vec<Preset>, CatalogError> {
    let presets: Vec<Preset> = serde_json::from_str(json).map_err(CatalogError::Parse)?;

    let mut seen = std::collections::HashSet::new();
    for preset in &presets {
        if !seen.insert(preset.id()) {
            return Err(CatalogError::DuplicatePreset(preset.id().to_string()));
        }
    }

    Ok(presets)
}

/// Loads a preset file.
pub fn load_presets(path: impl AsRef<Path>) -> Result<Vec<Preset>, CatalogError> {
    let path = path.as_ref();
    let json = read_file(path)?;
    let presets = presets_from_json(&json)?;
    debug!(path = %path.display(), presets = presets.len(), "presets loaded");
    Ok(presets)
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TagBuilder;

    fn config(mode: UserMode, scope: Scope) -> SessionConfig {
        SessionConfig {
            mode,
            scope,
            ..Default::default()
        }
    }

    #[test]
    fn hidden_tags_are_never_eligible() {
        let tag = TagBuilder::new("internal").mode(TagMode::Hidden).build();

        for mode in [UserMode::Simple, UserMode::Pro] {
            for scope in [Scope::Criminal, Scope::Civil, Scope::Both] {
                assert!(!is_eligible(&tag, &config(mode, scope)));
            }
        }
    }

    #[test]
    fn mode_must_match_unless_both() {
        let pro_only = TagBuilder::new("contributory").mode(TagMode::Pro).build();
        let both = TagBuilder::new("fracture").mode(TagMode::Both).build();

        assert!(!is_eligible(&pro_only, &config(UserMode::Simple, Scope::Both)));
        assert!(is_eligible(&pro_only, &config(UserMode::Pro, Scope::Both)));
        assert!(is_eligible(&both, &config(UserMode::Simple, Scope::Both)));
    }

    #[test]
    fn scope_matches_when_either_side_is_both() {
        let civil = TagBuilder::new("mental_damage").scope(Scope::Civil).build();
        let any = TagBuilder::new("fracture").scope(Scope::Both).build();

        assert!(is_eligible(&civil, &config(UserMode::Simple, Scope::Both)));
        assert!(is_eligible(&civil, &config(UserMode::Simple, Scope::Civil)));
        assert!(!is_eligible(&civil, &config(UserMode::Simple, Scope::Criminal)));
        assert!(is_eligible(&any, &config(UserMode::Simple, Scope::Criminal)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::from_tags(vec![
            TagBuilder::new("fracture").build(),
            TagBuilder::new("fracture").build(),
        ]);

        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id.as_str() == "fracture"));
    }

    #[test]
    fn from_json_reports_parse_errors() {
        let result = Catalog::from_json(r#"[{"id": "fracture"}]"#);
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn eligible_iterates_in_catalog_order() {
        let catalog = Catalog::from_tags(vec![
            TagBuilder::new("b").build(),
            TagBuilder::new("hidden").mode(TagMode::Hidden).build(),
            TagBuilder::new("a").build(),
        ])
        .unwrap();
        let config = SessionConfig::default();

        let ids: Vec<&str> = catalog.eligible(&config).map(|t| t.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn resolve_skips_unknown_ids() {
        let catalog = Catalog::from_tags(vec![TagBuilder::new("a").build()]).unwrap();
        let ids = vec![TagId::new("missing"), TagId::new("a")];

        let resolved: Vec<&str> = catalog.resolve(&ids).map(|t| t.id().as_str()).collect();
        assert_eq!(resolved, vec!["a"]);
    }

    #[test]
    fn duplicate_preset_ids_are_rejected() {
        let json = r#"[
            {"id": "p", "label": "A", "scope": "both", "tags": []},
            {"id": "p", "label": "B", "scope": "civil", "tags": []}
        ]"#;

        let result = presets_from_json(json);
        assert!(matches!(result, Err(CatalogError::DuplicatePreset(id)) if id == "p"));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = Catalog::load("/nonexistent/judq/tags.json");
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
