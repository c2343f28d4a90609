//! Fixed tag id sets that drive selection and composition rules.
//!
//! The built-in defaults match the traffic-accident catalog. Each set can
//! be overridden from the environment for other catalogs.

use crate::{CustomTier, TagId};

const LOCKED_CORE: &[&str] = &["traffic_accident", "tort_compensation"];
const DEFAULT_EXCLUDE: &[&str] = &["exclude_worksite", "exclude_occupational"];
const SALARY_NARROW: &[&str] = &["salary_loss", "labor_loss"];
const RARE_DETAIL: &[&str] = &["labor_loss", "death_mixed", "contributory"];
const COMMON_ORDER: &[&str] = &[
    "vehicle_damage",
    "injury_general",
    "medical_fee",
    "salary_loss",
    "nursing_fee",
];
const SETTINGS_ORDER: &[&str] = &[
    "fracture",
    "labor_loss",
    "death_mixed",
    "contusion",
    "mental_damage",
    "transport_fee",
    "drunk_driving",
    "pedestrian",
    "contributory",
];

/// Tag id sets used by the selection store, fitness estimator and composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPolicy {
    /// Always included, never user-togglable. Rendered first, in this order.
    pub locked_core: Vec<TagId>,
    /// Set to exclude on session start unless the user already chose.
    pub default_exclude: Vec<TagId>,
    /// Dropped in quick search unless narrowing is on or one is selected.
    pub salary_narrow: Vec<TagId>,
    /// Detail tags that make a selection narrow when two are included.
    pub rare_detail: Vec<TagId>,
    /// Display order of the `common` custom tier.
    pub common_order: Vec<TagId>,
    /// Display order of the `settings` custom tier.
    pub settings_order: Vec<TagId>,
}

impl Default for TagPolicy {
    fn default() -> Self {
        Self {
            locked_core: ids(LOCKED_CORE),
            default_exclude: ids(DEFAULT_EXCLUDE),
            salary_narrow: ids(SALARY_NARROW),
            rare_detail: ids(RARE_DETAIL),
            common_order: ids(COMMON_ORDER),
            settings_order: ids(SETTINGS_ORDER),
        }
    }
}

impl TagPolicy {
    /// Parses the policy from environment variables.
    ///
    /// Falls back to defaults when a variable is unset or lists no ids.
    ///
    /// # Environment Variables
    ///
    /// Each takes a comma-separated id list:
    ///
    /// - `JUDQ_LOCKED_CORE`
    /// - `JUDQ_DEFAULT_EXCLUDE`
    /// - `JUDQ_SALARY_NARROW`
    /// - `JUDQ_RARE_DETAIL`
    ///
    /// # Examples
    ///
    /// ```
    /// use judq::TagPolicy;
    ///
    /// let policy = TagPolicy::from_env();
    /// assert_eq!(policy.locked_core.len(), 2); // default when env var not set
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            locked_core: env_ids("JUDQ_LOCKED_CORE").unwrap_or(defaults.locked_core),
            default_exclude: env_ids("JUDQ_DEFAULT_EXCLUDE").unwrap_or(defaults.default_exclude),
            salary_narrow: env_ids("JUDQ_SALARY_NARROW").unwrap_or(defaults.salary_narrow),
            rare_detail: env_ids("JUDQ_RARE_DETAIL").unwrap_or(defaults.rare_detail),
            ..defaults
        }
    }

    pub fn is_locked_core(&self, id: &str) -> bool {
        contains(&self.locked_core, id)
    }

    pub fn is_default_exclude(&self, id: &str) -> bool {
        contains(&self.default_exclude, id)
    }

    pub fn is_salary_narrow(&self, id: &str) -> bool {
        contains(&self.salary_narrow, id)
    }

    pub fn is_rare_detail(&self, id: &str) -> bool {
        contains(&self.rare_detail, id)
    }

    /// Returns the display order for a custom tier, if one is configured.
    pub fn tier_order(&self, tier: CustomTier) -> Option<&[TagId]> {
        match tier {
            CustomTier::Common => Some(&self.common_order),
            CustomTier::Settings => Some(&self.settings_order),
            CustomTier::Hidden => None,
        }
    }
}

fn ids(raw: &[&str]) -> Vec<TagId> {
    raw.iter().copied().map(TagId::from).collect()
}

fn contains(set: &[TagId], id: &str) -> bool {
    set.iter().any(|candidate| candidate.as_str() == id)
}

fn env_ids(key: &str) -> Option<Vec<TagId>> {
    let raw = std::env::var(key).ok()?;
    let parsed: Vec<TagId> = raw
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(TagId::from)
        .collect();

    (!parsed.is_empty()).then_some(parsed)
}
