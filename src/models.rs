mod ids;
mod preset;
mod selection;
mod session_config;
mod tag;
mod tag_kinds;

pub use ids::TagId;
pub use preset::Preset;
pub use selection::{SelectionMark, SelectionState};
pub use session_config::{
    AdvancedFilters, DateRange, Intensity, SearchMode, SessionConfig, UserMode, format_date,
};
pub use tag::{Tag, TagBuilder, TagLabels};
pub use tag_kinds::{CustomTier, Scope, TagGroup, TagIntent, TagMode};
