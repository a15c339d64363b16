//! Data models for OpenAlex entities and local state.
//!
//! Upstream models use `#[serde(default)]` for optional fields and match the
//! API's snake_case naming; local models (`Paper`, filters) are camelCase on
//! the wire.

mod entities;
mod filters;
mod work;

pub use entities::{
    Author, EntityPage, Institution, InstitutionRef, Journal, TaxonomyRef, Topic,
};
pub use filters::{
    AuthorFilter, FilterSet, InstitutionFilter, JournalFilter, SortKey, TopicFilter,
};
pub use work::{
    Authorship, AuthorRef, InvertedIndex, JOURNAL_UNKNOWN, Location, OpenAccess, PageMeta, Paper,
    SourceRef, TITLE_UNAVAILABLE, Work, WorkPage, normalize_id, reconstruct_abstract,
};
