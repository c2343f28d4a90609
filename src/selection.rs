//! Selection store rules: which marks a tag may carry and how bulk actions
//! (baseline, reset, presets) rewrite a [`SelectionState`].

use thiserror::Error;
use tracing::debug;

use crate::catalog::is_eligible;
use crate::{
    Catalog, CustomTier, Preset, SelectionMark, SelectionState, SessionConfig, Tag, TagGroup,
    TagMode, TagPolicy,
};

/// Reasons composition is disabled for the current selection.
///
/// Not a failure: the caller shows the message and keeps the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionWarning {
    /// Only exclusions are selected.
    #[error("目前只有排除條件，請至少選擇一個求償主題或傷勢條件。")]
    ExcludeOnly,

    /// Nothing is selected at all.
    #[error("請至少選擇一個求償主題或傷勢條件。")]
    NothingSelected,
}

/// Applies the selection invariants against a catalog and tag policy.
///
/// The rules borrow the catalog and policy and operate on a
/// `SelectionState` owned elsewhere, so one session can hold all three.
///
/// # Examples
///
/// ```
/// use judq::{Catalog, SelectionRules, SelectionState, TagBuilder, TagGroup, TagPolicy};
///
/// let catalog = Catalog::from_tags(vec![
///     TagBuilder::new("fracture").group(TagGroup::Detail).build(),
///     TagBuilder::new("exclude_worksite").group(TagGroup::Exclude).build(),
/// ])
/// .unwrap();
/// let policy = TagPolicy::default();
/// let rules = SelectionRules::new(&catalog, &policy);
///
/// let mut state = SelectionState::new();
/// assert!(rules.set_include(&mut state, "fracture"));
/// assert!(!rules.set_include(&mut state, "exclude_worksite"));
/// assert!(state.is_included("fracture"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SelectionRules<'a> {
    catalog: &'a Catalog,
    policy: &'a TagPolicy,
}

impl<'a> SelectionRules<'a> {
    pub fn new(catalog: &'a Catalog, policy: &'a TagPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn policy(&self) -> &'a TagPolicy {
        self.policy
    }

    /// Marks a tag as included.
    ///
    /// No-op for unknown ids, exclude-group tags and locked-core tags.
    /// Returns whether the state changed.
    pub fn set_include(&self, state: &mut SelectionState, id: &str) -> bool {
        let Some(tag) = self.catalog.get(id) else {
            return false;
        };
        if tag.is_exclude_only() || self.policy.is_locked_core(id) {
            return false;
        }
        if state.is_included(id) {
            return false;
        }

        state.mark(tag.id().clone(), SelectionMark::Include);
        true
    }

    /// Marks a tag as excluded.
    ///
    /// No-op for unknown ids and locked-core tags.
    pub fn set_exclude(&self, state: &mut SelectionState, id: &str) -> bool {
        let Some(tag) = self.catalog.get(id) else {
            return false;
        };
        if self.policy.is_locked_core(id) || state.is_excluded(id) {
            return false;
        }

        state.mark(tag.id().clone(), SelectionMark::Exclude);
        true
    }

    /// Removes any mark from a tag. Locked-core tags keep their include.
    pub fn clear(&self, state: &mut SelectionState, id: &str) -> bool {
        if self.policy.is_locked_core(id) {
            return false;
        }
        state.unmark(id).is_some()
    }

    /// Toggles a tag the way a tag button does: untouched becomes include,
    /// any mark becomes untouched.
    ///
    /// Locked-core and exclude-group tags do not cycle; exclusion is only
    /// reachable through [`toggle_exclude`](Self::toggle_exclude).
    pub fn cycle(&self, state: &mut SelectionState, id: &str) -> bool {
        let Some(tag) = self.catalog.get(id) else {
            return false;
        };
        if tag.is_exclude_only() || self.policy.is_locked_core(id) {
            return false;
        }

        match state.get(id) {
            None => state.mark(tag.id().clone(), SelectionMark::Include),
            Some(_) => {
                state.unmark(id);
            }
        }
        true
    }

    /// Toggles a tag from the exclude list: excluded becomes untouched,
    /// anything else becomes excluded.
    pub fn toggle_exclude(&self, state: &mut SelectionState, id: &str) -> bool {
        if state.is_excluded(id) {
            self.clear(state, id)
        } else {
            self.set_exclude(state, id)
        }
    }

    /// Forces locked-core tags to include and defaults the default-exclude
    /// tags to exclude where the user has not chosen yet.
    ///
    /// Idempotent: applying it to its own output changes nothing.
    #[must_use]
    pub fn apply_baseline(&self, mut state: SelectionState) -> SelectionState {
        for id in &self.policy.locked_core {
            state.mark(id.clone(), SelectionMark::Include);
        }
        for id in &self.policy.default_exclude {
            if !state.contains(id.as_str()) {
                state.mark(id.clone(), SelectionMark::Exclude);
            }
        }
        state
    }

    /// Drops every include except locked-core, keeping every exclude.
    pub fn clear_includes(&self, state: &mut SelectionState) {
        state.retain(|_, mark| mark == SelectionMark::Exclude);
        for id in &self.policy.locked_core {
            state.mark(id.clone(), SelectionMark::Include);
        }
    }

    /// Excludes all default-exclude tags, or clears them all if every one
    /// is already excluded.
    pub fn toggle_default_excludes(&self, state: &mut SelectionState) {
        let all_excluded = self
            .policy
            .default_exclude
            .iter()
            .all(|id| state.is_excluded(id.as_str()));

        for id in &self.policy.default_exclude {
            if all_excluded {
                state.unmark(id.as_str());
            } else {
                state.mark(id.clone(), SelectionMark::Exclude);
            }
        }
    }

    /// Replaces the selection with a preset's tags on top of the baseline.
    ///
    /// Returns how many preset tags were included. The caller applies the
    /// preset's scope.
    pub fn apply_preset(&self, state: &mut SelectionState, preset: &Preset) -> usize {
        *state = self.apply_baseline(SelectionState::new());

        let applied = preset
            .tags()
            .iter()
            .filter(|id| self.set_include(state, id.as_str()))
            .count();
        debug!(preset = preset.id(), applied, "preset applied");
        applied
    }

    /// Returns the tags the user explicitly included that are eligible,
    /// in catalog order. Locked-core and core-group tags are not counted.
    pub fn user_included(&self, state: &SelectionState, config: &SessionConfig) -> Vec<&'a Tag> {
        self.catalog
            .eligible(config)
            .filter(|tag| self.is_custom_selectable(tag))
            .filter(|tag| state.is_included(tag.id().as_str()))
            .collect()
    }

    /// Returns true if at least one eligible, non-locked include exists.
    pub fn has_include_selection(&self, state: &SelectionState, config: &SessionConfig) -> bool {
        state.iter().any(|(id, mark)| {
            if mark != SelectionMark::Include || self.policy.is_locked_core(id.as_str()) {
                return false;
            }
            self.catalog.get(id.as_str()).is_some_and(|tag| {
                !tag.is_exclude_only() && tag.mode() != TagMode::Hidden && is_eligible(tag, config)
            })
        })
    }

    /// Returns the warning that blocks composition, if any.
    pub fn warning(
        &self,
        state: &SelectionState,
        config: &SessionConfig,
    ) -> Option<SelectionWarning> {
        if self.has_include_selection(state, config) {
            None
        } else if state.has_any(SelectionMark::Exclude) {
            Some(SelectionWarning::ExcludeOnly)
        } else {
            Some(SelectionWarning::NothingSelected)
        }
    }

    /// Lists the user-selectable tags of a custom tier.
    ///
    /// When the policy defines a display order for the tier, only tags
    /// named in it are listed, in that order. Otherwise catalog order.
    pub fn tier_tags(&self, config: &SessionConfig, tier: CustomTier) -> Vec<&'a Tag> {
        let catalog = self.catalog;
        let members = |tag: &&Tag| {
            self.is_custom_selectable(tag) && tag.custom_tier() == tier && is_eligible(tag, config)
        };

        match self.policy.tier_order(tier) {
            Some(order) if !order.is_empty() => catalog.resolve(order).filter(members).collect(),
            _ => catalog.iter().filter(members).collect(),
        }
    }

    /// Lists the eligible exclude-group tags, in catalog order.
    pub fn exclude_list(&self, config: &SessionConfig) -> Vec<&'a Tag> {
        self.catalog
            .eligible(config)
            .filter(|tag| tag.is_exclude_only())
            .collect()
    }

    fn is_custom_selectable(&self, tag: &Tag) -> bool {
        !matches!(tag.group(), TagGroup::Exclude | TagGroup::Core)
            && !self.policy.is_locked_core(tag.id().as_str())
    }
}
