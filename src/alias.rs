//! Free-text to tag resolution through plain-language aliases.

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::{Catalog, TagId, TermNormalizer};

/// Errors returned when free text cannot be resolved at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The input contained no terms after splitting.
    #[error("請先輸入至少一個白話關鍵字。")]
    EmptyInput,
}

/// Result of resolving free text against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AliasResolution {
    /// Matched tag ids, deduplicated, in order of first match.
    pub matched: Vec<TagId>,
    /// Input terms that no alias of any matched tag accounts for.
    pub unmatched: Vec<String>,
}

/// Normalized alias set of one tag.
#[derive(Debug, Clone)]
struct AliasEntry {
    id: TagId,
    aliases: Vec<String>,
}

impl AliasEntry {
    /// Bidirectional substring match. Short aliases match broadly.
    fn matches(&self, term: &str) -> bool {
        !term.is_empty()
            && self
                .aliases
                .iter()
                .any(|alias| alias.contains(term) || term.contains(alias.as_str()))
    }
}

/// Maps colloquial phrases to catalog tags.
///
/// Each tag's alias set is its `plain_alias` entries plus both display
/// labels, each normalized with [`TermNormalizer::normalize`]. Alias sets
/// are computed once when the resolver is built.
///
/// # Examples
///
/// ```
/// use judq::{AliasResolver, Catalog, TagBuilder};
///
/// let catalog = Catalog::from_tags(vec![
///     TagBuilder::new("death_mixed").plain_alias(["死亡賠償", "過世"]).build(),
/// ])
/// .unwrap();
/// let resolver = AliasResolver::new(&catalog);
///
/// let resolution = resolver.resolve("死亡");
/// assert_eq!(resolution.matched.len(), 1);
/// assert!(resolution.unmatched.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct AliasResolver {
    entries: Vec<AliasEntry>,
}

impl AliasResolver {
    /// Builds a resolver over every tag in the catalog, in catalog order.
    pub fn new(catalog: &Catalog) -> Self {
        let entries = catalog
            .iter()
            .map(|tag| {
                let aliases = tag
                    .plain_alias()
                    .iter()
                    .map(String::as_str)
                    .chain([tag.labels().simple.as_str(), tag.labels().pro.as_str()])
                    .map(TermNormalizer::normalize)
                    .filter(|alias| !alias.is_empty())
                    .collect();
                AliasEntry {
                    id: tag.id().clone(),
                    aliases,
                }
            })
            .collect();

        Self { entries }
    }

    /// Resolves free text into tag ids.
    ///
    /// Exclude-group tags are reported like any other match; deciding not
    /// to include them is left to the caller.
    pub fn resolve(&self, text: &str) -> AliasResolution {
        self.resolve_terms(&TermNormalizer::split_terms(text))
    }

    /// Resolves already split terms.
    pub fn resolve_terms(&self, terms: &[String]) -> AliasResolution {
        let normalized: Vec<String> = terms
            .iter()
            .map(|term| TermNormalizer::normalize(term))
            .collect();

        let mut seen = HashSet::new();
        let mut matched_entries = Vec::new();
        for term in &normalized {
            for entry in &self.entries {
                if entry.matches(term) && seen.insert(&entry.id) {
                    matched_entries.push(entry);
                }
            }
        }

        let unmatched = terms
            .iter()
            .zip(&normalized)
            .filter(|(_, term)| !matched_entries.iter().any(|entry| entry.matches(term)))
            .map(|(raw, _)| raw.clone())
            .collect::<Vec<_>>();

        debug!(
            terms = terms.len(),
            matched = matched_entries.len(),
            unmatched = unmatched.len(),
            "free text resolved"
        );

        AliasResolution {
            matched: matched_entries.into_iter().map(|e| e.id.clone()).collect(),
            unmatched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TagBuilder, TagGroup};

    fn catalog() -> Catalog {
        Catalog::from_tags(vec![
            TagBuilder::new("death_mixed")
                .labels("死亡", "死亡與其他損害")
                .plain_alias(["死亡賠償", "家人過世"])
                .build(),
            TagBuilder::new("salary_loss")
                .labels("薪水損失", "薪資損失")
                .plain_alias(["不能工作", "少賺的錢"])
                .build(),
            TagBuilder::new("exclude_worksite")
                .group(TagGroup::Exclude)
                .labels("排除工地", "排除職災工地")
                .plain_alias(["工地"])
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn term_contained_in_alias_matches() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("死亡");

        assert_eq!(resolution.matched, vec![TagId::new("death_mixed")]);
        assert!(resolution.unmatched.is_empty());
    }

    #[test]
    fn alias_contained_in_term_matches() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("我不能工作三個月");

        assert_eq!(resolution.matched, vec![TagId::new("salary_loss")]);
    }

    #[test]
    fn labels_are_aliases_too() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("薪資損失");

        assert_eq!(resolution.matched, vec![TagId::new("salary_loss")]);
    }

    #[test]
    fn unmatched_terms_are_reported_verbatim() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("死亡，機車!， 過世");

        assert_eq!(resolution.matched, vec![TagId::new("death_mixed")]);
        assert_eq!(resolution.unmatched, vec!["機車!".to_string()]);
    }

    #[test]
    fn matches_are_deduplicated_in_first_match_order() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("少賺的錢 死亡賠償 薪水");

        assert_eq!(
            resolution.matched,
            vec![TagId::new("salary_loss"), TagId::new("death_mixed")]
        );
    }

    #[test]
    fn exclude_group_tags_are_still_reported() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("工地");

        assert_eq!(resolution.matched, vec![TagId::new("exclude_worksite")]);
    }

    #[test]
    fn punctuation_only_term_matches_nothing() {
        let resolver = AliasResolver::new(&catalog());
        let resolution = resolver.resolve("？？");

        assert!(resolution.matched.is_empty());
        assert_eq!(resolution.unmatched, vec!["？？".to_string()]);
    }
}
