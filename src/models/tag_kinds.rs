use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog group of a tag.
///
/// Groups decide which intensity levels may include a tag and whether the
/// tag can only ever be used as an exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagGroup {
    Core,
    Context,
    Damages,
    Detail,
    Responsibility,
    /// Exclusion-only tags. Never held as an include.
    Exclude,
}

/// Role of a tag inside a composed query.
///
/// Unknown intent values in a catalog are read as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagIntent {
    Context,
    Damages,
    Injury,
    #[serde(other)]
    Other,
}

/// Which user mode a tag is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    Simple,
    Pro,
    Both,
    /// Never eligible.
    Hidden,
}

/// Case-type partition, shared by tags, presets and the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Criminal,
    Civil,
    #[default]
    Both,
}

impl Scope {
    /// Parses a scope keyword, returning `None` for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "criminal" => Some(Self::Criminal),
            "civil" => Some(Self::Civil),
            "both" => Some(Self::Both),
            _ => None,
        }
    }

    /// Display label used in query summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Criminal => "刑事",
            Self::Civil => "民事",
            Self::Both => "刑事＋民事",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Criminal => write!(f, "criminal"),
            Self::Civil => write!(f, "civil"),
            Self::Both => write!(f, "both"),
        }
    }
}

/// UI grouping for the custom search panel. Irrelevant to composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomTier {
    Common,
    Settings,
    #[default]
    Hidden,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_deserializes_from_lowercase() {
        let group: TagGroup = serde_json::from_str(r#""responsibility""#).unwrap();
        assert_eq!(group, TagGroup::Responsibility);

        let result: Result<TagGroup, _> = serde_json::from_str(r#""unknown""#);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_intent_reads_as_other() {
        let intent: TagIntent = serde_json::from_str(r#""procedure""#).unwrap();
        assert_eq!(intent, TagIntent::Other);

        let intent: TagIntent = serde_json::from_str(r#""injury""#).unwrap();
        assert_eq!(intent, TagIntent::Injury);
    }

    #[test]
    fn scope_parse_and_display_agree() {
        for scope in [Scope::Criminal, Scope::Civil, Scope::Both] {
            assert_eq!(Scope::parse(&scope.to_string()), Some(scope));
        }
        assert_eq!(Scope::parse("admin"), None);
    }

    #[test]
    fn scope_labels_use_full_width_plus_for_both() {
        assert_eq!(Scope::Criminal.label(), "刑事");
        assert_eq!(Scope::Both.label(), "刑事＋民事");
    }

    #[test]
    fn custom_tier_defaults_to_hidden() {
        assert_eq!(CustomTier::default(), CustomTier::Hidden);
    }
}
