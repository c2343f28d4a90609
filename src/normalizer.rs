use std::sync::LazyLock;

use regex::Regex;

/// Anything outside letters, digits, whitespace and the query operators.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\p{L}\p{N}\s\x{FEFF}+\-&()]").expect("disallowed-character pattern is valid")
});

/// Whitespace runs, counting the byte-order mark as whitespace.
static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{FEFF}]+").expect("whitespace pattern is valid"));

/// Text normalization shared by alias matching and query rendering.
///
/// The target search engine treats `&` as AND, `+` as OR inside
/// parentheses and a leading `-` as negation, so those operators survive
/// normalization while every other punctuation mark is dropped.
pub struct TermNormalizer;

impl TermNormalizer {
    /// Normalizes free text into a search-safe term.
    ///
    /// # Normalization rules
    ///
    /// - Keeps letters, digits, whitespace and `+ - & ( )`
    /// - Removes every other character
    /// - Collapses runs of whitespace to a single space
    /// - Trims leading/trailing whitespace
    ///
    /// Letters and digits are matched by Unicode general category (`L` and
    /// `N`), so CJK text passes through untouched while combining marks and
    /// symbols are dropped. No case folding is applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use judq::TermNormalizer;
    ///
    /// assert_eq!(TermNormalizer::normalize("  交通事故！ "), "交通事故");
    /// assert_eq!(TermNormalizer::normalize("醫療費用 ,  醫藥費"), "醫療費用 醫藥費");
    /// assert_eq!(TermNormalizer::normalize("(骨折+挫傷)&-工地"), "(骨折+挫傷)&-工地");
    /// assert_eq!(TermNormalizer::normalize("110年度訴字第123號"), "110年度訴字第123號");
    /// ```
    #[must_use]
    pub fn normalize(text: &str) -> String {
        let kept = DISALLOWED.replace_all(text, "");
        SPACE_RUN.replace_all(&kept, " ").trim().to_string()
    }

    /// Splits free text into raw terms.
    ///
    /// Separators are runs of whitespace and the ASCII and full-width comma,
    /// semicolon and enumeration comma (`, ， 、 ; ；`). Terms are trimmed
    /// and empty terms dropped; they are not normalized.
    ///
    /// # Examples
    ///
    /// ```
    /// use judq::TermNormalizer;
    ///
    /// assert_eq!(
    ///     TermNormalizer::split_terms("骨折，住院；  死亡、工作"),
    ///     vec!["骨折", "住院", "死亡", "工作"]
    /// );
    /// assert!(TermNormalizer::split_terms(" ,; ").is_empty());
    /// ```
    #[must_use]
    pub fn split_terms(text: &str) -> Vec<String> {
        text.split(|c: char| {
            c.is_whitespace() || matches!(c, '\u{FEFF}' | ',' | '，' | '、' | ';' | '；')
        })
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(String::from)
            .collect()
    }
}
