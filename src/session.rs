use std::fmt;

use time::Date;
use tracing::{debug, info};

use crate::codec::{self, SessionState};
use crate::{
    AliasResolver, Catalog, DateRange, Fitness, Intensity, Preset, QueryComposer, QueryMeta,
    ResolveError, Scope, SearchMode, SelectionMark, SelectionRules, SelectionState,
    SelectionSummary, SelectionWarning, SessionConfig, TagId, TagPolicy, TermNormalizer, UserMode,
    fitness,
};

/// Outcome of applying free text to a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FreeTextOutcome {
    /// Tags that were matched and included. Exclude-group matches are not
    /// applied and do not appear here.
    pub applied: Vec<TagId>,
    /// Input terms no alias of a matched tag accounts for, verbatim.
    pub unmatched: Vec<String>,
}

impl fmt::Display for FreeTextOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unmatched.is_empty() {
            write!(f, "已套用 {} 個標籤。", self.applied.len())
        } else {
            write!(
                f,
                "已套用 {} 個標籤，未匹配：{}",
                self.applied.len(),
                self.unmatched.join("、")
            )
        }
    }
}

/// One user's query-building session.
///
/// Session owns the catalog, presets, tag policy, config and selection.
/// Every mutating action goes through it, and the share query is
/// re-mirrored before the action returns, so [`share_query`](Self::share_query)
/// always reflects the current state.
///
/// # Examples
///
/// ```
/// use judq::{Catalog, Intensity, Session, TagBuilder, TagGroup, TagPolicy};
/// use time::macros::date;
///
/// let catalog = Catalog::from_tags(vec![
///     TagBuilder::new("traffic_accident").legal_core("交通事故").group(TagGroup::Core).build(),
///     TagBuilder::new("tort_compensation").legal_core("侵權行為").group(TagGroup::Core).build(),
///     TagBuilder::new("fracture").legal_core("骨折").group(TagGroup::Detail).build(),
/// ])
/// .unwrap();
///
/// let mut session = Session::new(catalog, Vec::new(), TagPolicy::default(), date!(2026 - 10 - 19));
/// session.cycle("fracture");
///
/// assert_eq!(session.compose(Intensity::Balanced), "交通事故&侵權行為&骨折");
/// assert!(session.share_query().contains("sel=fracture%2Ctort_compensation%2Ctraffic_accident"));
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    catalog: Catalog,
    presets: Vec<Preset>,
    policy: TagPolicy,
    config: SessionConfig,
    selection: SelectionState,
    share_query: String,
}

impl Session {
    /// Starts a fresh session: default config, baseline selection and the
    /// default date range ending `today`.
    pub fn new(catalog: Catalog, presets: Vec<Preset>, policy: TagPolicy, today: Date) -> Self {
        Self::restore(catalog, presets, policy, "", today)
    }

    /// Rehydrates a session from a share-link query string.
    ///
    /// Decoded marks go through the selection rules, so unknown ids and
    /// exclude-group includes are dropped. The baseline is applied
    /// afterwards. The date range is re-derived from `today` only when the
    /// link carries neither a start nor an end date.
    pub fn restore(
        catalog: Catalog,
        presets: Vec<Preset>,
        policy: TagPolicy,
        query: &str,
        today: Date,
    ) -> Self {
        let decoded = codec::from_query_string(query);
        let mut config = decoded.config;

        let rules = SelectionRules::new(&catalog, &policy);
        let mut selection = SelectionState::new();
        for (id, mark) in decoded.selection.iter() {
            match mark {
                SelectionMark::Include => rules.set_include(&mut selection, id.as_str()),
                SelectionMark::Exclude => rules.set_exclude(&mut selection, id.as_str()),
            };
        }
        let dropped = decoded.selection.len().saturating_sub(selection.len());
        let selection = rules.apply_baseline(selection);

        if config.advanced.start_date.is_empty() && config.advanced.end_date.is_empty() {
            config.apply_date_range(config.date_range, today);
        }

        info!(marks = selection.len(), dropped, "session restored");

        let mut session = Self {
            catalog,
            presets,
            policy,
            config,
            selection,
            share_query: String::new(),
        };
        session.mirror();
        session
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn policy(&self) -> &TagPolicy {
        &self.policy
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Returns the share-link query string for the current state, without a
    /// leading `?`.
    pub fn share_query(&self) -> &str {
        &self.share_query
    }

    /// Returns the selection rules bound to this session's catalog and policy.
    pub fn rules(&self) -> SelectionRules<'_> {
        SelectionRules::new(&self.catalog, &self.policy)
    }

    // --- config ---

    pub fn set_mode(&mut self, mode: UserMode) {
        self.config.mode = mode;
        self.mirror();
    }

    pub fn set_search_mode(&mut self, search_mode: SearchMode) {
        self.config.search_mode = search_mode;
        self.mirror();
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.config.scope = scope;
        self.mirror();
    }

    pub fn set_intensity(&mut self, intensity: Intensity) {
        self.config.intensity = intensity;
        self.mirror();
    }

    /// Sets the date range and rewrites the start and end dates from it.
    pub fn set_date_range(&mut self, range: DateRange, today: Date) {
        self.config.apply_date_range(range, today);
        self.mirror();
    }

    pub fn set_salary_narrow(&mut self, enabled: bool) {
        self.config.use_salary_narrow = enabled;
        self.mirror();
    }

    pub fn set_court(&mut self, court: impl Into<String>) {
        self.config.advanced.court = court.into();
        self.mirror();
    }

    pub fn set_case_no(&mut self, case_no: impl Into<String>) {
        self.config.advanced.case_no = case_no.into();
        self.mirror();
    }

    pub fn set_start_date(&mut self, start: impl Into<String>) {
        self.config.advanced.start_date = start.into();
        self.mirror();
    }

    pub fn set_end_date(&mut self, end: impl Into<String>) {
        self.config.advanced.end_date = end.into();
        self.mirror();
    }

    // --- selection ---

    pub fn set_include(&mut self, id: &str) -> bool {
        let changed = SelectionRules::new(&self.catalog, &self.policy)
            .set_include(&mut self.selection, id);
        self.mirror();
        changed
    }

    pub fn set_exclude(&mut self, id: &str) -> bool {
        let changed = SelectionRules::new(&self.catalog, &self.policy)
            .set_exclude(&mut self.selection, id);
        self.mirror();
        changed
    }

    /// Removes any mark from a tag.
    pub fn remove(&mut self, id: &str) -> bool {
        let changed =
            SelectionRules::new(&self.catalog, &self.policy).clear(&mut self.selection, id);
        self.mirror();
        changed
    }

    /// Toggles a tag button: untouched becomes include, any mark clears.
    pub fn cycle(&mut self, id: &str) -> bool {
        let changed =
            SelectionRules::new(&self.catalog, &self.policy).cycle(&mut self.selection, id);
        self.mirror();
        changed
    }

    pub fn toggle_exclude(&mut self, id: &str) -> bool {
        let changed = SelectionRules::new(&self.catalog, &self.policy)
            .toggle_exclude(&mut self.selection, id);
        self.mirror();
        changed
    }

    /// Drops user includes, keeping excludes and locked-core tags.
    pub fn clear_includes(&mut self) {
        SelectionRules::new(&self.catalog, &self.policy).clear_includes(&mut self.selection);
        self.mirror();
    }

    pub fn toggle_default_excludes(&mut self) {
        SelectionRules::new(&self.catalog, &self.policy)
            .toggle_default_excludes(&mut self.selection);
        self.mirror();
    }

    /// Replaces the selection with a preset and adopts its scope.
    ///
    /// Returns how many preset tags were included, or `None` if no preset
    /// has that id.
    pub fn apply_preset(&mut self, preset_id: &str) -> Option<usize> {
        let preset = self.presets.iter().find(|p| p.id() == preset_id)?;
        let applied = SelectionRules::new(&self.catalog, &self.policy)
            .apply_preset(&mut self.selection, preset);
        self.config.scope = preset.scope();
        self.mirror();
        Some(applied)
    }

    /// Resolves free text and includes every matched tag that may be
    /// included.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::EmptyInput`] when the text holds no terms.
    pub fn apply_free_text(&mut self, text: &str) -> Result<FreeTextOutcome, ResolveError> {
        let terms = TermNormalizer::split_terms(text);
        if terms.is_empty() {
            return Err(ResolveError::EmptyInput);
        }

        let resolution = AliasResolver::new(&self.catalog).resolve_terms(&terms);
        let rules = SelectionRules::new(&self.catalog, &self.policy);

        let mut applied = Vec::new();
        for id in resolution.matched {
            let Some(tag) = self.catalog.get(id.as_str()) else {
                continue;
            };
            if tag.is_exclude_only() {
                continue;
            }
            rules.set_include(&mut self.selection, id.as_str());
            if self.selection.is_included(id.as_str()) {
                applied.push(id);
            }
        }

        debug!(applied = applied.len(), "free text applied");
        self.mirror();

        Ok(FreeTextOutcome {
            applied,
            unmatched: resolution.unmatched,
        })
    }

    // --- derived output ---

    fn composer(&self) -> QueryComposer<'_> {
        QueryComposer::new(&self.catalog, &self.policy, &self.selection, &self.config)
    }

    /// Composes the query string for an intensity.
    pub fn compose(&self, intensity: Intensity) -> String {
        self.composer().compose(intensity)
    }

    /// Composes the query at the session's intensity, unless the selection
    /// has no eligible include.
    ///
    /// # Errors
    ///
    /// Returns the [`SelectionWarning`] that disables generation.
    pub fn generate(&self) -> Result<String, SelectionWarning> {
        match self.warning() {
            Some(warning) => Err(warning),
            None => Ok(self.compose(self.config.intensity)),
        }
    }

    pub fn warning(&self) -> Option<SelectionWarning> {
        self.rules().warning(&self.selection, &self.config)
    }

    pub fn has_include_selection(&self) -> bool {
        self.rules().has_include_selection(&self.selection, &self.config)
    }

    pub fn fitness(&self) -> Fitness {
        fitness::estimate(&self.rules(), &self.selection, &self.config)
    }

    /// Lists the labels the current query is built from.
    pub fn summary(&self) -> SelectionSummary {
        self.composer().summary()
    }

    /// Scope, date window and salary-narrow status for display beside the
    /// query.
    pub fn meta(&self) -> QueryMeta {
        QueryMeta::from_config(&self.config)
    }

    fn mirror(&mut self) {
        let state = SessionState {
            config: self.config.clone(),
            selection: self.selection.clone(),
        };
        self.share_query = codec::to_query_string(&state);
    }
}
