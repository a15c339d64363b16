//! User-selected search filters and sort order.

use serde::{Deserialize, Serialize};

use crate::config::limits;
use crate::error::CapacityError;

/// A selected journal, unique by ISSN.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JournalFilter {
    /// Canonical ISSN.
    pub issn: String,

    /// Journal display name.
    pub name: String,
}

/// A selected author, unique by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthorFilter {
    /// Normalized author id.
    pub id: String,

    /// Author display name.
    pub name: String,
}

/// A selected topic with its taxonomy labels, unique by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicFilter {
    /// Normalized topic id.
    pub id: String,

    /// Topic display name.
    pub name: String,

    /// Subfield label.
    #[serde(default)]
    pub subfield: Option<String>,

    /// Field label.
    #[serde(default)]
    pub field: Option<String>,

    /// Domain label.
    #[serde(default)]
    pub domain: Option<String>,
}

/// A selected institution, unique by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionFilter {
    /// Normalized institution id.
    pub id: String,

    /// Institution display name.
    pub name: String,

    /// ISO country code.
    #[serde(default)]
    pub country: Option<String>,

    /// Institution type.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Sort order for search results.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Upstream relevance ranking (the API default; no sort param emitted).
    #[default]
    Relevance,

    /// Newest first.
    DateDesc,

    /// Oldest first.
    DateAsc,

    /// Most cited first.
    CitationCountDesc,
}

impl SortKey {
    /// Upstream sort parameter, or `None` for relevance (the API default).
    #[must_use]
    pub const fn sort_param(self) -> Option<&'static str> {
        match self {
            Self::Relevance => None,
            Self::DateDesc => Some("publication_date:desc"),
            Self::DateAsc => Some("publication_date:asc"),
            Self::CitationCountDesc => Some("cited_by_count:desc"),
        }
    }
}

/// The full set of user-selected filters.
///
/// Selections keep insertion order and are deduplicated by their identity
/// key (ISSN for journals, id for everything else). The journal list is
/// capped: additions beyond the cap are rejected, never truncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    /// Selected journals (capped at [`limits::MAX_JOURNAL_FILTERS`]).
    #[serde(default)]
    pub journals: Vec<JournalFilter>,

    /// Selected authors.
    #[serde(default)]
    pub authors: Vec<AuthorFilter>,

    /// Selected topics.
    #[serde(default)]
    pub topics: Vec<TopicFilter>,

    /// Selected institutions.
    #[serde(default)]
    pub institutions: Vec<InstitutionFilter>,

    /// Publication type (e.g. "article", "review").
    #[serde(default)]
    pub publication_type: Option<String>,

    /// Inclusive start of the publication-date range (ISO date).
    #[serde(default)]
    pub from_date: Option<String>,

    /// Inclusive end of the publication-date range (ISO date).
    #[serde(default)]
    pub to_date: Option<String>,
}

impl FilterSet {
    /// Add a journal selection.
    ///
    /// Duplicate ISSNs are a no-op. Exceeding the journal cap is rejected
    /// and leaves the set unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::JournalLimit`] when the cap is reached.
    pub fn add_journal(&mut self, journal: JournalFilter) -> Result<(), CapacityError> {
        if self.journals.iter().any(|j| j.issn == journal.issn) {
            return Ok(());
        }
        if self.journals.len() >= limits::MAX_JOURNAL_FILTERS {
            return Err(CapacityError::JournalLimit { max: limits::MAX_JOURNAL_FILTERS });
        }
        self.journals.push(journal);
        Ok(())
    }

    /// Remove a journal selection by ISSN.
    pub fn remove_journal(&mut self, issn: &str) {
        self.journals.retain(|j| j.issn != issn);
    }

    /// Add an author selection; duplicate ids are a no-op.
    pub fn add_author(&mut self, author: AuthorFilter) {
        if !self.authors.iter().any(|a| a.id == author.id) {
            self.authors.push(author);
        }
    }

    /// Add a topic selection; duplicate ids are a no-op.
    pub fn add_topic(&mut self, topic: TopicFilter) {
        if !self.topics.iter().any(|t| t.id == topic.id) {
            self.topics.push(topic);
        }
    }

    /// Add an institution selection; duplicate ids are a no-op.
    pub fn add_institution(&mut self, institution: InstitutionFilter) {
        if !self.institutions.iter().any(|i| i.id == institution.id) {
            self.institutions.push(institution);
        }
    }

    /// Validate a wholesale filter set (e.g. one arriving over the API).
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::JournalLimit`] when the journal list exceeds
    /// the cap.
    pub fn validate(&self) -> Result<(), CapacityError> {
        if self.journals.len() > limits::MAX_JOURNAL_FILTERS {
            return Err(CapacityError::JournalLimit { max: limits::MAX_JOURNAL_FILTERS });
        }
        Ok(())
    }

    /// True when no filter is selected at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.journals.is_empty()
            && self.authors.is_empty()
            && self.topics.is_empty()
            && self.institutions.is_empty()
            && self.publication_type.is_none()
            && self.from_date.is_none()
            && self.to_date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journal(issn: &str) -> JournalFilter {
        JournalFilter { issn: issn.to_string(), name: format!("Journal {issn}") }
    }

    #[test]
    fn test_journal_dedup_by_issn() {
        let mut filters = FilterSet::default();
        filters.add_journal(journal("0028-0836")).unwrap();
        filters.add_journal(journal("0028-0836")).unwrap();
        assert_eq!(filters.journals.len(), 1);
    }

    #[test]
    fn test_journal_cap_rejected_not_truncated() {
        let mut filters = FilterSet::default();
        for i in 0..limits::MAX_JOURNAL_FILTERS {
            filters.add_journal(journal(&format!("{i:04}-0000"))).unwrap();
        }

        let err = filters.add_journal(journal("9999-9999")).unwrap_err();
        assert_eq!(err, CapacityError::JournalLimit { max: limits::MAX_JOURNAL_FILTERS });
        // Prior state untouched.
        assert_eq!(filters.journals.len(), limits::MAX_JOURNAL_FILTERS);
        assert!(!filters.journals.iter().any(|j| j.issn == "9999-9999"));
    }

    #[test]
    fn test_validate_over_cap() {
        let mut filters = FilterSet::default();
        filters.journals =
            (0..=limits::MAX_JOURNAL_FILTERS).map(|i| journal(&format!("{i:04}-0000"))).collect();
        assert!(filters.validate().is_err());
    }

    #[test]
    fn test_author_dedup() {
        let mut filters = FilterSet::default();
        let a = AuthorFilter { id: "A1".to_string(), name: "Ada".to_string() };
        filters.add_author(a.clone());
        filters.add_author(a);
        assert_eq!(filters.authors.len(), 1);
    }

    #[test]
    fn test_sort_param_relevance_omitted() {
        assert_eq!(SortKey::Relevance.sort_param(), None);
        assert_eq!(SortKey::DateDesc.sort_param(), Some("publication_date:desc"));
        assert_eq!(SortKey::CitationCountDesc.sort_param(), Some("cited_by_count:desc"));
    }

    #[test]
    fn test_is_empty() {
        let mut filters = FilterSet::default();
        assert!(filters.is_empty());
        filters.publication_type = Some("article".to_string());
        assert!(!filters.is_empty());
    }
}
