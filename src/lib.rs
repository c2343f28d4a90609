pub mod alias;
pub mod catalog;
pub mod codec;
pub mod composer;
pub mod fitness;
pub mod models;
pub mod normalizer;
pub mod policy;
pub mod selection;
pub mod session;
pub mod utils;

pub use alias::{AliasResolution, AliasResolver, ResolveError};
pub use catalog::{Catalog, CatalogError, is_eligible, load_presets, presets_from_json};
pub use codec::{SessionState, UrlParams};
pub use composer::{
    BudgetCaps, NarrowStatus, QueryComposer, QueryMeta, QueryPlan, SelectionSummary,
};
pub use fitness::{Fitness, estimate};
pub use models::{
    AdvancedFilters, CustomTier, DateRange, Intensity, Preset, Scope, SearchMode, SelectionMark,
    SelectionState, SessionConfig, Tag, TagBuilder, TagGroup, TagId, TagIntent, TagLabels, TagMode,
    UserMode, format_date,
};
pub use normalizer::TermNormalizer;
pub use policy::TagPolicy;
pub use selection::{SelectionRules, SelectionWarning};
pub use session::{FreeTextOutcome, Session};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_accessible_from_crate_root() {
        let catalog = Catalog::from_json("[]");
        assert!(catalog.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let tag = TagBuilder::new("fracture").legal_core("骨折").build();
        assert_eq!(tag.id(), &TagId::new("fracture"));

        let mark = SelectionMark::Exclude;
        assert_eq!(format!("{}", mark), "exclude");

        let config = SessionConfig::default();
        assert_eq!(config.intensity, Intensity::Balanced);
        assert_eq!(Fitness::Broad.label(), "偏寬");
    }
}
