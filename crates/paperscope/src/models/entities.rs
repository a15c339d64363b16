//! Author, institution, topic, and journal entities from the OpenAlex graph.

use serde::{Deserialize, Serialize};

use super::work::normalize_id;

/// An author entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Author {
    /// OpenAlex author ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Author display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Total works by this author.
    #[serde(default)]
    pub works_count: Option<i64>,

    /// Last known affiliation display name.
    #[serde(default)]
    pub last_known_institutions: Vec<InstitutionRef>,
}

/// An institution entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Institution {
    /// OpenAlex institution ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Institution display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// ISO country code.
    #[serde(default)]
    pub country_code: Option<String>,

    /// Institution type (education, company, government, ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Minimal institution reference on an author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionRef {
    /// Institution display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A topic entity with its taxonomy labels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topic {
    /// OpenAlex topic ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Topic display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Parent subfield.
    #[serde(default)]
    pub subfield: Option<TaxonomyRef>,

    /// Parent field.
    #[serde(default)]
    pub field: Option<TaxonomyRef>,

    /// Parent domain.
    #[serde(default)]
    pub domain: Option<TaxonomyRef>,
}

/// A taxonomy label (subfield/field/domain).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaxonomyRef {
    /// Label display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A journal (source) entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    /// OpenAlex source ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Journal display name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Canonical linking ISSN.
    #[serde(default)]
    pub issn_l: Option<String>,
}

/// Paged entity response shared by the author/institution/topic/source endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityPage<T> {
    /// Entities in this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

macro_rules! impl_normalized_id {
    ($($ty:ty),+) => {
        $(impl $ty {
            /// Normalized entity identifier, or empty string when absent.
            #[must_use]
            pub fn normalized_id(&self) -> String {
                self.id.as_deref().map(normalize_id).unwrap_or_default()
            }
        })+
    };
}

impl_normalized_id!(Author, Institution, Topic, Journal);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_deserialize() {
        let json = r#"{
            "id": "https://openalex.org/T10001",
            "display_name": "Monetary Policy",
            "subfield": {"display_name": "Economics"},
            "field": {"display_name": "Economics, Econometrics and Finance"},
            "domain": {"display_name": "Social Sciences"}
        }"#;

        let topic: Topic = serde_json::from_str(json).unwrap();
        assert_eq!(topic.normalized_id(), "T10001");
        assert_eq!(topic.domain.unwrap().display_name.as_deref(), Some("Social Sciences"));
    }

    #[test]
    fn test_entity_page_defaults() {
        let page: EntityPage<Journal> = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }
}
