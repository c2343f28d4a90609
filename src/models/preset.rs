use serde::{Deserialize, Serialize};

use super::{Scope, TagId};

/// A named, externally curated bundle of tag selections.
///
/// Applying a preset replaces the whole selection and sets the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    id: String,
    label: String,
    scope: Scope,
    tags: Vec<TagId>,
}

impl Preset {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        scope: Scope,
        tags: Vec<TagId>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            scope,
            tags,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the tag ids the preset includes, in preset order.
    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_preset_record() {
        let json = r#"{
            "id": "minor_injury",
            "label": "輕傷求償",
            "scope": "civil",
            "tags": ["medical_fee", "contusion"]
        }"#;

        let preset: Preset = serde_json::from_str(json).unwrap();

        assert_eq!(preset.id(), "minor_injury");
        assert_eq!(preset.label(), "輕傷求償");
        assert_eq!(preset.scope(), Scope::Civil);
        assert_eq!(
            preset.tags(),
            &[TagId::new("medical_fee"), TagId::new("contusion")]
        );
    }
}
