//! Advisory breadth classification of the current selection.

use serde::Serialize;
use std::fmt;

use crate::{SelectionRules, SelectionState, SessionConfig, Tag, TagPolicy};

/// How wide a search the current selection is likely to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fitness {
    Broad,
    Balanced,
    Narrow,
}

impl Fitness {
    /// Classifies a set of user-included tags.
    ///
    /// One tag or fewer is broad; six or more, or two rare detail tags, is
    /// narrow; anything else is balanced.
    pub fn classify(included: &[&Tag], policy: &TagPolicy) -> Self {
        let count = included.len();
        let rare = included
            .iter()
            .filter(|tag| policy.is_rare_detail(tag.id().as_str()))
            .count();

        if count <= 1 {
            Self::Broad
        } else if count >= 6 || rare >= 2 {
            Self::Narrow
        } else {
            Self::Balanced
        }
    }

    /// Short badge label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Broad => "偏寬",
            Self::Balanced => "適中",
            Self::Narrow => "偏窄",
        }
    }

    /// One-line advice shown next to the badge.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Broad => "條件偏少，建議再加 1-2 個細項提高精準度。",
            Self::Balanced => "條件適中，可直接產出。",
            Self::Narrow => "條件較嚴格，若結果太少可先移除 1-2 個細項。",
        }
    }
}

impl fmt::Display for Fitness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broad => write!(f, "broad"),
            Self::Balanced => write!(f, "balanced"),
            Self::Narrow => write!(f, "narrow"),
        }
    }
}

/// Estimates the fitness of a selection under a session config.
///
/// Only eligible, user-included tags count; locked-core tags never do.
pub fn estimate(
    rules: &SelectionRules<'_>,
    state: &SelectionState,
    config: &SessionConfig,
) -> Fitness {
    let included = rules.user_included(state, config);
    Fitness::classify(&included, rules.policy())
}
