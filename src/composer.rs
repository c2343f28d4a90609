//! Query composition: selection state in, boolean search string out.
//!
//! The target search engine reads `&` as AND, `+` as OR inside
//! parentheses and a leading `-` as NOT.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::catalog::is_eligible;
use crate::{
    Catalog, DateRange, Intensity, Scope, SearchMode, SelectionMark, SelectionRules,
    SelectionState, SessionConfig, Tag, TagIntent, TagPolicy, TermNormalizer,
};

/// Maximum tags kept per intent bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetCaps {
    pub damages: usize,
    pub injury: usize,
    pub context: usize,
    pub other: usize,
}

impl BudgetCaps {
    /// Caps applied at balanced intensity.
    pub const BALANCED: Self = Self {
        damages: 4,
        injury: 4,
        context: 2,
        other: 1,
    };

    /// Returns the caps for an intensity, or `None` when uncapped.
    pub fn for_intensity(intensity: Intensity) -> Option<Self> {
        match intensity {
            Intensity::Balanced => Some(Self::BALANCED),
            Intensity::Loose | Intensity::Strict => None,
        }
    }
}

/// The tags chosen for a query, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan<'a> {
    /// Locked-core tags first, then damages, injury, context, other.
    pub included: Vec<&'a Tag>,
    /// Excluded tags in catalog order.
    pub excluded: Vec<&'a Tag>,
}

/// Composes the search string for one session snapshot.
///
/// Output depends only on the catalog, policy, selection and config, so
/// repeated calls return byte-identical strings.
///
/// # Examples
///
/// ```
/// use judq::{
///     Catalog, Intensity, QueryComposer, SelectionRules, SelectionState, SessionConfig,
///     TagBuilder, TagGroup, TagPolicy,
/// };
///
/// let catalog = Catalog::from_tags(vec![
///     TagBuilder::new("traffic_accident").legal_core("交通事故").group(TagGroup::Core).build(),
///     TagBuilder::new("tort_compensation").legal_core("侵權行為").group(TagGroup::Core).build(),
/// ])
/// .unwrap();
/// let policy = TagPolicy::default();
/// let state = SelectionState::new();
/// let config = SessionConfig::default();
///
/// let composer = QueryComposer::new(&catalog, &policy, &state, &config);
/// assert_eq!(composer.compose(Intensity::Balanced), "交通事故&侵權行為");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct QueryComposer<'a> {
    catalog: &'a Catalog,
    policy: &'a TagPolicy,
    state: &'a SelectionState,
    config: &'a SessionConfig,
}

impl<'a> QueryComposer<'a> {
    pub fn new(
        catalog: &'a Catalog,
        policy: &'a TagPolicy,
        state: &'a SelectionState,
        config: &'a SessionConfig,
    ) -> Self {
        Self {
            catalog,
            policy,
            state,
            config,
        }
    }

    /// Chooses the include and exclude tags for an intensity.
    pub fn plan(&self, intensity: Intensity) -> QueryPlan<'a> {
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        for tag in self.catalog.eligible(self.config) {
            match self.state.get(tag.id().as_str()) {
                Some(SelectionMark::Include) if intensity.allows(tag.group()) => included.push(tag),
                Some(SelectionMark::Exclude) => excluded.push(tag),
                _ => {}
            }
        }

        let locked: Vec<&Tag> = self
            .catalog
            .resolve(&self.policy.locked_core)
            .filter(|tag| is_eligible(tag, self.config))
            .collect();

        let selected: Vec<&Tag> = included
            .into_iter()
            .filter(|tag| !self.policy.is_locked_core(tag.id().as_str()))
            .collect();
        let selected = self.apply_salary_filter(selected);

        let mut buckets = IntentBuckets::default();
        for tag in selected {
            buckets.push(tag);
        }
        buckets.sort_by_weight();
        if let Some(caps) = BudgetCaps::for_intensity(intensity) {
            buckets.truncate(caps);
        }

        let mut seen = HashSet::new();
        let included: Vec<&Tag> = locked
            .into_iter()
            .chain(buckets.into_ordered())
            .filter(|tag| seen.insert(tag.id()))
            .collect();

        debug!(
            %intensity,
            included = included.len(),
            excluded = excluded.len(),
            "query planned"
        );

        QueryPlan { included, excluded }
    }

    /// Composes the final query string for an intensity.
    ///
    /// Returns an empty string when there is nothing to search for.
    pub fn compose(&self, intensity: Intensity) -> String {
        let plan = self.plan(intensity);
        let include_tokens: Vec<String> = plan
            .included
            .iter()
            .filter_map(|t| include_token(t))
            .collect();
        let exclude_tokens: Vec<String> = plan
            .excluded
            .iter()
            .filter_map(|t| exclude_token(t))
            .collect();

        let mut tokens = Vec::new();
        let court = TermNormalizer::normalize(&self.config.advanced.court);
        if !court.is_empty() {
            tokens.push(court);
        }
        let case_no = TermNormalizer::normalize(&self.config.advanced.case_no);
        if !case_no.is_empty() {
            tokens.push(case_no);
        }
        if !include_tokens.is_empty() {
            tokens.push(include_tokens.join("&"));
        }
        if !exclude_tokens.is_empty() {
            tokens.push(exclude_tokens.join("&"));
        }

        TermNormalizer::normalize(&tokens.join("&"))
    }

    /// Lists what the query is built from, as display labels in the
    /// session's user mode.
    pub fn summary(&self) -> SelectionSummary {
        let mode = self.config.mode;
        let label = |tag: &&Tag| tag.label(mode).to_string();

        let locked = self
            .catalog
            .resolve(&self.policy.locked_core)
            .filter(|tag| is_eligible(tag, self.config))
            .map(|tag| label(&tag))
            .collect();
        let included = SelectionRules::new(self.catalog, self.policy)
            .user_included(self.state, self.config)
            .iter()
            .map(label)
            .collect();
        let excluded = self
            .catalog
            .eligible(self.config)
            .filter(|tag| self.state.is_excluded(tag.id().as_str()))
            .map(|tag| label(&tag))
            .collect();

        SelectionSummary {
            locked,
            included,
            excluded,
        }
    }

    /// Drops the salary-narrow tags in quick search unless narrowing is on.
    ///
    /// Presence is checked on the unfiltered list, so a user who selected
    /// any salary-narrow tag keeps all of them.
    fn apply_salary_filter(&self, selected: Vec<&'a Tag>) -> Vec<&'a Tag> {
        if self.config.search_mode == SearchMode::Custom {
            return selected;
        }

        let keep_salary = selected
            .iter()
            .any(|tag| self.policy.is_salary_narrow(tag.id().as_str()));
        if self.config.use_salary_narrow || keep_salary {
            return selected;
        }

        debug!("salary-narrow tags filtered");
        selected
            .into_iter()
            .filter(|tag| !self.policy.is_salary_narrow(tag.id().as_str()))
            .collect()
    }
}

/// Display labels behind a composed query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionSummary {
    pub locked: Vec<String>,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl fmt::Display for SelectionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let included = if self.included.is_empty() {
            "未額外選擇".to_string()
        } else {
            self.included.join("、")
        };
        let excluded = if self.excluded.is_empty() {
            "無".to_string()
        } else {
            self.excluded.join("、")
        };

        write!(
            f,
            "本次產出依據：固定核心（{}）；你選擇（{included}）；排除（{excluded}）。",
            self.locked.join("、")
        )
    }
}

/// Whether the salary-narrow filter shapes the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowStatus {
    On,
    Off,
    /// Custom search keeps every selected salary tag.
    NotApplicable,
}

impl NarrowStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::On => "開啟",
            Self::Off => "關閉",
            Self::NotApplicable => "自選模式不套用",
        }
    }
}

/// Settings shown beside a composed query: scope, date window and the
/// salary-narrow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryMeta {
    pub scope: Scope,
    pub date_range: DateRange,
    pub narrow: NarrowStatus,
}

impl QueryMeta {
    pub fn from_config(config: &SessionConfig) -> Self {
        let narrow = match (config.search_mode, config.use_salary_narrow) {
            (SearchMode::Custom, _) => NarrowStatus::NotApplicable,
            (SearchMode::Quick, true) => NarrowStatus::On,
            (SearchMode::Quick, false) => NarrowStatus::Off,
        };
        Self {
            scope: config.scope,
            date_range: config.date_range,
            narrow,
        }
    }
}

impl fmt::Display for QueryMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "範圍：{}｜期間：{}｜窄搜：{}",
            self.scope.label(),
            self.date_range.label(),
            self.narrow.label()
        )
    }
}

#[derive(Debug, Default)]
struct IntentBuckets<'a> {
    context: Vec<&'a Tag>,
    damages: Vec<&'a Tag>,
    injury: Vec<&'a Tag>,
    other: Vec<&'a Tag>,
}

impl<'a> IntentBuckets<'a> {
    fn push(&mut self, tag: &'a Tag) {
        match tag.intent() {
            TagIntent::Context => self.context.push(tag),
            TagIntent::Damages => self.damages.push(tag),
            TagIntent::Injury => self.injury.push(tag),
            TagIntent::Other => self.other.push(tag),
        }
    }

    /// Stable sort, so equal weights keep catalog order.
    fn sort_by_weight(&mut self) {
        for bucket in [
            &mut self.context,
            &mut self.damages,
            &mut self.injury,
            &mut self.other,
        ] {
            bucket.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
        }
    }

    fn truncate(&mut self, caps: BudgetCaps) {
        self.damages.truncate(caps.damages);
        self.injury.truncate(caps.injury);
        self.context.truncate(caps.context);
        self.other.truncate(caps.other);
    }

    fn into_ordered(self) -> impl Iterator<Item = &'a Tag> {
        self.damages
            .into_iter()
            .chain(self.injury)
            .chain(self.context)
            .chain(self.other)
    }
}

/// Returns the normalized, non-empty search terms of a tag: the legal core
/// followed by its synonyms.
pub fn tag_terms(tag: &Tag) -> Vec<String> {
    std::iter::once(tag.legal_core())
        .chain(tag.legal_synonyms().iter().map(String::as_str))
        .map(TermNormalizer::normalize)
        .filter(|term| !term.is_empty())
        .collect()
}

/// Renders a tag as an include token: a bare term, or an OR-group when the
/// tag has synonyms.
pub fn include_token(tag: &Tag) -> Option<String> {
    let terms = tag_terms(tag);
    match terms.len() {
        0 => None,
        1 => terms.into_iter().next(),
        _ => Some(format!("({})", terms.join("+"))),
    }
}

/// Renders a tag as a negated OR-group, even for a single term.
pub fn exclude_token(tag: &Tag) -> Option<String> {
    let terms = tag_terms(tag);
    if terms.is_empty() {
        return None;
    }
    Some(format!("-({})", terms.join("+")))
}
