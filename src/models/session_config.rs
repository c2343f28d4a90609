use serde::{Deserialize, Serialize};
use std::fmt;
use time::macros::format_description;
use time::{Date, Month};
use tracing::warn;

use super::{Scope, TagGroup};

/// Display register chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserMode {
    #[default]
    Simple,
    Pro,
}

impl UserMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "simple" => Some(Self::Simple),
            "pro" => Some(Self::Pro),
            _ => None,
        }
    }
}

impl fmt::Display for UserMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

/// Quick search works from presets; custom search from hand-picked tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Quick,
    Custom,
}

impl SearchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quick" => Some(Self::Quick),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "quick"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Named tier controlling which tag groups are eligible and how many tags
/// per intent bucket survive composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Loose,
    #[default]
    Balanced,
    Strict,
}

impl Intensity {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "loose" => Some(Self::Loose),
            "balanced" => Some(Self::Balanced),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    /// Returns true if tags of `group` may be included at this intensity.
    ///
    /// Exclude-group tags are never includable.
    pub fn allows(self, group: TagGroup) -> bool {
        match group {
            TagGroup::Core | TagGroup::Context | TagGroup::Damages => true,
            TagGroup::Detail => matches!(self, Self::Balanced | Self::Strict),
            TagGroup::Responsibility => self == Self::Strict,
            TagGroup::Exclude => false,
        }
    }

    /// Display label used in query summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Loose => "寬鬆",
            Self::Balanced => "平衡",
            Self::Strict => "嚴格",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loose => write!(f, "loose"),
            Self::Balanced => write!(f, "balanced"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Decision-date window relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRange {
    #[default]
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "all")]
    All,
}

impl DateRange {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "5y" => Some(Self::FiveYears),
            "10y" => Some(Self::TenYears),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// Returns the `(start, end)` window ending `today`, or `None` for `All`.
    ///
    /// The start is the same calendar day `N` years back; Feb 29 in a
    /// non-leap target year rolls forward to Mar 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use judq::DateRange;
    /// use time::macros::date;
    ///
    /// let (start, end) = DateRange::FiveYears.bounds(date!(2026 - 10 - 19)).unwrap();
    /// assert_eq!(start, date!(2021 - 10 - 19));
    /// assert_eq!(end, date!(2026 - 10 - 19));
    /// assert_eq!(DateRange::All.bounds(date!(2026 - 10 - 19)), None);
    /// ```
    pub fn bounds(self, today: Date) -> Option<(Date, Date)> {
        let years = match self {
            Self::FiveYears => 5,
            Self::TenYears => 10,
            Self::All => return None,
        };
        let year = today.year() - years;
        let start = Date::from_calendar_date(year, today.month(), today.day())
            .or_else(|_| Date::from_calendar_date(year, Month::March, 1))
            .ok()?;
        Some((start, today))
    }

    /// Display label used in query summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::FiveYears => "近5年",
            Self::TenYears => "近10年",
            Self::All => "不限定",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FiveYears => write!(f, "5y"),
            Self::TenYears => write!(f, "10y"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Free-text and date fields from the advanced search panel.
///
/// Stored verbatim; normalization happens at composition time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedFilters {
    pub court: String,
    pub case_no: String,
    pub start_date: String,
    pub end_date: String,
}

/// Per-session settings that shape eligibility and composition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub mode: UserMode,
    pub search_mode: SearchMode,
    pub scope: Scope,
    pub intensity: Intensity,
    pub date_range: DateRange,
    pub use_salary_narrow: bool,
    pub advanced: AdvancedFilters,
}

impl SessionConfig {
    /// Sets the date range and rewrites the advanced start/end dates from it.
    ///
    /// A window that cannot be formatted leaves both dates empty.
    pub fn apply_date_range(&mut self, range: DateRange, today: Date) {
        self.date_range = range;
        let window = range.bounds(today).and_then(|(start, end)| {
            match (format_date(start), format_date(end)) {
                (Ok(start), Ok(end)) => Some((start, end)),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(%range, error = %e, "date window not formatted");
                    None
                }
            }
        });
        let (start, end) = window.unwrap_or_default();
        self.advanced.start_date = start;
        self.advanced.end_date = end;
    }
}

/// Formats a date as `YYYY-MM-DD`.
///
/// # Errors
///
/// Fails for years outside `0000..=9999`.
pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn intensity_group_filters_widen_with_strictness() {
        assert!(Intensity::Loose.allows(TagGroup::Damages));
        assert!(!Intensity::Loose.allows(TagGroup::Detail));
        assert!(Intensity::Balanced.allows(TagGroup::Detail));
        assert!(!Intensity::Balanced.allows(TagGroup::Responsibility));
        assert!(Intensity::Strict.allows(TagGroup::Responsibility));

        for intensity in [Intensity::Loose, Intensity::Balanced, Intensity::Strict] {
            assert!(!intensity.allows(TagGroup::Exclude));
        }
    }

    #[test]
    fn ten_year_range_derives_start_and_end() {
        let mut config = SessionConfig::default();
        config.apply_date_range(DateRange::TenYears, date!(2026 - 03 - 05));

        assert_eq!(config.date_range, DateRange::TenYears);
        assert_eq!(config.advanced.start_date, "2016-03-05");
        assert_eq!(config.advanced.end_date, "2026-03-05");
    }

    #[test]
    fn all_range_clears_dates() {
        let mut config = SessionConfig::default();
        config.apply_date_range(DateRange::FiveYears, date!(2026 - 03 - 05));
        config.apply_date_range(DateRange::All, date!(2026 - 03 - 05));

        assert!(config.advanced.start_date.is_empty());
        assert!(config.advanced.end_date.is_empty());
    }

    #[test]
    fn leap_day_rolls_forward_in_non_leap_year() {
        let (start, _) = DateRange::FiveYears.bounds(date!(2028 - 02 - 29)).unwrap();
        assert_eq!(start, date!(2023 - 03 - 01));
    }

    #[test]
    fn format_date_pads_month_and_day() {
        assert_eq!(format_date(date!(2026 - 03 - 05)).unwrap(), "2026-03-05");
        let early = Date::from_calendar_date(987, Month::November, 30).unwrap();
        assert_eq!(format_date(early).unwrap(), "0987-11-30");
    }

    #[test]
    fn labels_name_each_setting() {
        assert_eq!(Intensity::Loose.label(), "寬鬆");
        assert_eq!(Intensity::Strict.label(), "嚴格");
        assert_eq!(DateRange::TenYears.label(), "近10年");
        assert_eq!(DateRange::All.label(), "不限定");
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = SessionConfig::default();

        assert_eq!(config.mode, UserMode::Simple);
        assert_eq!(config.search_mode, SearchMode::Quick);
        assert_eq!(config.scope, Scope::Both);
        assert_eq!(config.intensity, Intensity::Balanced);
        assert_eq!(config.date_range, DateRange::FiveYears);
        assert!(!config.use_salary_narrow);
    }
}
