//! Share-link state codec.
//!
//! A session is mirrored into a URL query string so it can be bookmarked or
//! shared. Decoding never fails: every missing or malformed value falls back
//! to its default on its own.

use tracing::debug;

use crate::{
    AdvancedFilters, DateRange, Intensity, Scope, SearchMode, SelectionMark, SelectionState,
    SessionConfig, TagId, UserMode,
};

/// Ordered `key=value` pairs of a query string.
///
/// # Examples
///
/// ```
/// use judq::UrlParams;
///
/// let params = UrlParams::parse("?court=%E8%87%BA%E5%8C%97&sel=a%2Cb");
/// assert_eq!(params.get("court"), Some("臺北"));
/// assert_eq!(params.get("sel"), Some("a,b"));
/// assert_eq!(params.to_query_string(), "court=%E8%87%BA%E5%8C%97&sel=a%2Cb");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParams {
    pairs: Vec<(String, String)>,
}

impl UrlParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string. A leading `?` is ignored, `+` decodes to a
    /// space and a key without `=` has an empty value.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();

        Self { pairs }
    }

    /// Returns the first value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Appends a pair, keeping earlier pairs for the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Renders the pairs percent-encoded, in insertion order, without a
    /// leading `?`.
    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Everything a share link carries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub config: SessionConfig,
    pub selection: SelectionState,
}

/// Encodes a session into share-link parameters.
///
/// Advanced fields and id lists are only written when non-empty. Id lists
/// are comma-joined in id order.
pub fn serialize(state: &SessionState) -> UrlParams {
    let config = &state.config;
    let mut params = UrlParams::new();

    params.append("mode", config.mode.to_string());
    params.append("searchMode", config.search_mode.to_string());
    params.append("scope", config.scope.to_string());
    params.append("intensity", config.intensity.to_string());
    params.append("date", config.date_range.to_string());
    params.append("salaryNarrow", if config.use_salary_narrow { "1" } else { "0" });

    let advanced = &config.advanced;
    for (key, value) in [
        ("court", &advanced.court),
        ("caseNo", &advanced.case_no),
        ("start", &advanced.start_date),
        ("end", &advanced.end_date),
    ] {
        if !value.is_empty() {
            params.append(key, value.as_str());
        }
    }

    for (key, mark) in [("sel", SelectionMark::Include), ("exc", SelectionMark::Exclude)] {
        let ids = state.selection.ids_with(mark);
        if !ids.is_empty() {
            let joined = ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(",");
            params.append(key, joined);
        }
    }

    params
}

/// Decodes share-link parameters into a session.
///
/// Includes are applied before excludes, so an id listed in both ends up
/// excluded. Ids are not checked against any catalog here.
pub fn deserialize(params: &UrlParams) -> SessionState {
    let config = SessionConfig {
        mode: parse_or_default(params.get("mode"), UserMode::parse),
        search_mode: parse_or_default(params.get("searchMode"), SearchMode::parse),
        scope: parse_or_default(params.get("scope"), Scope::parse),
        intensity: parse_or_default(params.get("intensity"), Intensity::parse),
        date_range: parse_or_default(params.get("date"), DateRange::parse),
        use_salary_narrow: params.get("salaryNarrow") == Some("1"),
        advanced: AdvancedFilters {
            court: text(params, "court"),
            case_no: text(params, "caseNo"),
            start_date: text(params, "start"),
            end_date: text(params, "end"),
        },
    };

    let mut selection = SelectionState::new();
    for (key, mark) in [("sel", SelectionMark::Include), ("exc", SelectionMark::Exclude)] {
        for id in id_list(params.get(key)) {
            selection.mark(TagId::new(id), mark);
        }
    }

    debug!(marks = selection.len(), "share state decoded");
    SessionState { config, selection }
}

/// Shorthand for `serialize(state).to_query_string()`.
pub fn to_query_string(state: &SessionState) -> String {
    serialize(state).to_query_string()
}

/// Shorthand for `deserialize(&UrlParams::parse(query))`.
pub fn from_query_string(query: &str) -> SessionState {
    deserialize(&UrlParams::parse(query))
}

fn parse_or_default<T: Default>(value: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> T {
    value.and_then(parse).unwrap_or_default()
}

fn text(params: &UrlParams, key: &str) -> String {
    params.get(key).unwrap_or_default().to_string()
}

fn id_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
}
