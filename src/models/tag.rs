use serde::{Deserialize, Serialize};

use super::{CustomTier, Scope, TagGroup, TagId, TagIntent, TagMode, UserMode};

/// Display labels for a tag, one per user mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TagLabels {
    pub simple: String,
    pub pro: String,
}

/// A catalog entry representing one legal or factual concept.
///
/// `legal_core` and `legal_synonyms` are the search terms OR'd together
/// when the tag is rendered; `plain_alias` holds colloquial phrases used by
/// free-text matching only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    id: TagId,
    labels: TagLabels,
    legal_core: String,
    #[serde(default)]
    legal_synonyms: Vec<String>,
    #[serde(default)]
    plain_alias: Vec<String>,
    group: TagGroup,
    intent: TagIntent,
    mode: TagMode,
    scope: Scope,
    #[serde(default)]
    custom_tier: CustomTier,
    #[serde(default)]
    weight: f64,
}

impl Tag {
    /// Returns the tag's unique identifier.
    pub fn id(&self) -> &TagId {
        &self.id
    }

    pub fn labels(&self) -> &TagLabels {
        &self.labels
    }

    /// Returns the label shown to a user in the given mode.
    pub fn label(&self, mode: UserMode) -> &str {
        match mode {
            UserMode::Simple => &self.labels.simple,
            UserMode::Pro => &self.labels.pro,
        }
    }

    /// Returns the primary search term.
    pub fn legal_core(&self) -> &str {
        &self.legal_core
    }

    /// Returns the alternate search terms, in catalog order.
    pub fn legal_synonyms(&self) -> &[String] {
        &self.legal_synonyms
    }

    /// Returns the colloquial phrases used by free-text matching.
    pub fn plain_alias(&self) -> &[String] {
        &self.plain_alias
    }

    pub fn group(&self) -> TagGroup {
        self.group
    }

    pub fn intent(&self) -> TagIntent {
        self.intent
    }

    pub fn mode(&self) -> TagMode {
        self.mode
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn custom_tier(&self) -> CustomTier {
        self.custom_tier
    }

    /// Returns the budget priority; higher weights survive truncation first.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Returns true for exclusion-only tags.
    pub fn is_exclude_only(&self) -> bool {
        self.group == TagGroup::Exclude
    }
}

/// Builder for constructing `Tag` instances outside of catalog loading.
///
/// Unset fields default to a context-group tag of intent `other`, visible in
/// both modes and both scopes, with no synonyms and weight 0.
///
/// # Examples
///
/// ```
/// use judq::{TagBuilder, TagGroup, TagIntent};
///
/// let tag = TagBuilder::new("medical_fee")
///     .legal_core("醫療費用")
///     .synonyms(["醫藥費"])
///     .group(TagGroup::Damages)
///     .intent(TagIntent::Damages)
///     .weight(9.0)
///     .build();
///
/// assert_eq!(tag.id().as_str(), "medical_fee");
/// assert_eq!(tag.legal_synonyms(), &["醫藥費"]);
/// ```
#[derive(Debug)]
pub struct TagBuilder {
    tag: Tag,
}

impl TagBuilder {
    /// Creates a new `TagBuilder` for the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            tag: Tag {
                labels: TagLabels {
                    simple: id.clone(),
                    pro: id.clone(),
                },
                id: TagId::new(id),
                legal_core: String::new(),
                legal_synonyms: Vec::new(),
                plain_alias: Vec::new(),
                group: TagGroup::Context,
                intent: TagIntent::Other,
                mode: TagMode::Both,
                scope: Scope::Both,
                custom_tier: CustomTier::Hidden,
                weight: 0.0,
            },
        }
    }

    pub fn labels(mut self, simple: impl Into<String>, pro: impl Into<String>) -> Self {
        self.tag.labels = TagLabels {
            simple: simple.into(),
            pro: pro.into(),
        };
        self
    }

    pub fn legal_core(mut self, term: impl Into<String>) -> Self {
        self.tag.legal_core = term.into();
        self
    }

    pub fn synonyms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag.legal_synonyms = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn plain_alias<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag.plain_alias = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn group(mut self, group: TagGroup) -> Self {
        self.tag.group = group;
        self
    }

    pub fn intent(mut self, intent: TagIntent) -> Self {
        self.tag.intent = intent;
        self
    }

    pub fn mode(mut self, mode: TagMode) -> Self {
        self.tag.mode = mode;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.tag.scope = scope;
        self
    }

    pub fn custom_tier(mut self, tier: CustomTier) -> Self {
        self.tag.custom_tier = tier;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.tag.weight = weight;
        self
    }

    /// Builds the `Tag`.
    pub fn build(self) -> Tag {
        self.tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_record_with_defaults() {
        let json = r#"{
            "id": "fracture",
            "labels": { "simple": "骨折", "pro": "骨折傷害" },
            "legalCore": "骨折",
            "group": "detail",
            "intent": "injury",
            "mode": "both",
            "scope": "civil"
        }"#;

        let tag: Tag = serde_json::from_str(json).unwrap();

        assert_eq!(tag.id().as_str(), "fracture");
        assert_eq!(tag.group(), TagGroup::Detail);
        assert_eq!(tag.intent(), TagIntent::Injury);
        assert_eq!(tag.scope(), Scope::Civil);
        assert!(tag.legal_synonyms().is_empty());
        assert!(tag.plain_alias().is_empty());
        assert_eq!(tag.custom_tier(), CustomTier::Hidden);
        assert_eq!(tag.weight(), 0.0);
    }

    #[test]
    fn label_follows_user_mode() {
        let tag = TagBuilder::new("contusion").labels("瘀傷", "挫傷").build();

        assert_eq!(tag.label(UserMode::Simple), "瘀傷");
        assert_eq!(tag.label(UserMode::Pro), "挫傷");
    }

    #[test]
    fn exclude_group_is_exclude_only() {
        let tag = TagBuilder::new("exclude_worksite")
            .group(TagGroup::Exclude)
            .build();
        assert!(tag.is_exclude_only());

        let tag = TagBuilder::new("fracture").group(TagGroup::Detail).build();
        assert!(!tag.is_exclude_only());
    }

    #[test]
    fn builder_defaults_label_to_id() {
        let tag = TagBuilder::new("pedestrian").build();

        assert_eq!(tag.labels().simple, "pedestrian");
        assert_eq!(tag.labels().pro, "pedestrian");
        assert_eq!(tag.mode(), TagMode::Both);
    }
}
