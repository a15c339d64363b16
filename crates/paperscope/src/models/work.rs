//! Work data model matching the OpenAlex API schema, plus the local Paper record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// OpenAlex entity IDs arrive as full URLs; everything local uses the bare key.
const ID_PREFIX: &str = "https://openalex.org/";

/// DOI values arrive as resolver URLs.
const DOI_PREFIX: &str = "https://doi.org/";

/// Title placeholder for malformed records.
pub const TITLE_UNAVAILABLE: &str = "Title not available";

/// Venue placeholder when a work has no source.
pub const JOURNAL_UNKNOWN: &str = "Unknown";

/// Strip the OpenAlex namespace prefix from an identifier.
///
/// Idempotent: already-bare ids pass through unchanged, and repeated
/// prefixes (seen in hand-assembled urls) are stripped completely.
#[must_use]
pub fn normalize_id(id: &str) -> String {
    let mut bare = id.trim();
    while let Some(stripped) = bare.strip_prefix(ID_PREFIX) {
        bare = stripped.trim();
    }
    bare.to_string()
}

/// Word -> zero-based positions mapping used by OpenAlex to encode abstracts.
pub type InvertedIndex = HashMap<String, Vec<usize>>;

/// Largest abstract position honored during reconstruction. Upstream
/// positions are untrusted input; anything past this is dropped rather than
/// sized for.
const MAX_ABSTRACT_POSITION: usize = 10_000;

/// Rebuild abstract text from an inverted index.
///
/// Allocates a sparse sequence sized to the maximum in-range position + 1,
/// places each word at each of its listed positions, and joins with single
/// spaces. Unfilled positions contribute empty strings; positions past
/// [`MAX_ABSTRACT_POSITION`] are ignored. Pure: same index, same output.
#[must_use]
pub fn reconstruct_abstract(index: &InvertedIndex) -> String {
    let Some(max_pos) =
        index.values().flatten().copied().filter(|&pos| pos <= MAX_ABSTRACT_POSITION).max()
    else {
        return String::new();
    };

    // Place words in sorted order so position collisions resolve the same
    // way regardless of map iteration order.
    let mut words: Vec<(&String, &Vec<usize>)> = index.iter().collect();
    words.sort_unstable_by_key(|(word, _)| *word);

    let mut slots: Vec<&str> = vec![""; max_pos + 1];
    for (word, positions) in words {
        for &pos in positions {
            if pos <= max_pos {
                slots[pos] = word.as_str();
            }
        }
    }

    slots.join(" ")
}

/// A work (paper) record from the OpenAlex graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Work {
    /// OpenAlex work ID (full URL form in responses).
    #[serde(default)]
    pub id: Option<String>,

    /// Work title.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Authorships in listed order.
    #[serde(default)]
    pub authorships: Vec<Authorship>,

    /// Publication year.
    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Primary hosting location (carries the source/journal).
    #[serde(default)]
    pub primary_location: Option<Location>,

    /// DOI as a resolver URL.
    #[serde(default)]
    pub doi: Option<String>,

    /// Open access information.
    #[serde(default)]
    pub open_access: Option<OpenAccess>,

    /// Inbound citation count.
    #[serde(default)]
    pub cited_by_count: Option<i64>,

    /// Outbound reference count.
    #[serde(default)]
    pub referenced_works_count: Option<i64>,

    /// Full outbound reference-id list (only with the references projection).
    #[serde(default)]
    pub referenced_works: Vec<String>,

    /// Abstract encoded as an inverted index, or absent.
    #[serde(default)]
    pub abstract_inverted_index: Option<InvertedIndex>,
}

impl Work {
    /// Normalized work identifier, or empty string for malformed records.
    #[must_use]
    pub fn normalized_id(&self) -> String {
        self.id.as_deref().map(normalize_id).unwrap_or_default()
    }

    /// Author display names in listed order.
    #[must_use]
    pub fn author_names(&self) -> Vec<String> {
        self.authorships
            .iter()
            .filter_map(|a| a.author.as_ref()?.display_name.clone())
            .collect()
    }

    /// Journal/source display name, defaulting to "Unknown".
    #[must_use]
    pub fn journal_name(&self) -> String {
        self.primary_location
            .as_ref()
            .and_then(|l| l.source.as_ref())
            .and_then(|s| s.display_name.clone())
            .unwrap_or_else(|| JOURNAL_UNKNOWN.to_string())
    }

    /// Bare DOI with the resolver prefix stripped.
    #[must_use]
    pub fn bare_doi(&self) -> Option<String> {
        self.doi.as_deref().map(|d| d.strip_prefix(DOI_PREFIX).unwrap_or(d).to_string())
    }
}

/// An authorship entry on a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorship {
    /// The author behind this authorship.
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

/// Minimal author reference inside an authorship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorRef {
    /// OpenAlex author ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Author display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A hosting location for a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// The source (journal, repository) hosting the work.
    #[serde(default)]
    pub source: Option<SourceRef>,
}

/// Minimal source reference inside a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Open access information for a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAccess {
    /// Direct URL to an open-access copy.
    #[serde(default)]
    pub oa_url: Option<String>,
}

/// Paged works response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkPage {
    /// Result metadata.
    #[serde(default)]
    pub meta: PageMeta,

    /// Works in this page.
    #[serde(default)]
    pub results: Vec<Work>,
}

/// Result-set metadata on a paged response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total number of matching records.
    #[serde(default)]
    pub count: i64,
}

/// Local paper record: the reshaped, normalized view of a work.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Normalized work identifier (identity key).
    pub id: String,

    /// Title, with a placeholder for malformed records.
    pub title: String,

    /// Author display names in listed order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Journal name, "Unknown" when absent.
    pub journal: String,

    /// Bare DOI.
    #[serde(default)]
    pub doi: Option<String>,

    /// Open-access PDF URL.
    #[serde(default)]
    pub pdf_url: Option<String>,

    /// Inbound citation count (non-negative).
    #[serde(default)]
    pub citation_count: i64,

    /// Outbound reference count.
    #[serde(default)]
    pub referenced_works_count: Option<i64>,

    /// Reconstructed abstract text.
    #[serde(default)]
    pub abstract_text: Option<String>,
}

impl From<&Work> for Paper {
    fn from(work: &Work) -> Self {
        let abstract_text = work
            .abstract_inverted_index
            .as_ref()
            .map(reconstruct_abstract)
            .filter(|s| !s.is_empty());

        Self {
            id: work.normalized_id(),
            title: work.display_name.clone().unwrap_or_else(|| TITLE_UNAVAILABLE.to_string()),
            authors: work.author_names(),
            year: work.publication_year,
            journal: work.journal_name(),
            doi: work.bare_doi(),
            pdf_url: work.open_access.as_ref().and_then(|oa| oa.oa_url.clone()),
            citation_count: work.cited_by_count.unwrap_or(0).max(0),
            referenced_works_count: work.referenced_works_count,
            abstract_text,
        }
    }
}

impl From<Work> for Paper {
    fn from(work: Work) -> Self {
        Self::from(&work)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id_strips_prefix() {
        assert_eq!(normalize_id("https://openalex.org/W123"), "W123");
        assert_eq!(normalize_id("W123"), "W123");
    }

    #[test]
    fn test_normalize_id_idempotent() {
        let once = normalize_id("https://openalex.org/W2741809807");
        assert_eq!(normalize_id(&once), once);
    }

    #[test]
    fn test_reconstruct_abstract() {
        let mut index = InvertedIndex::new();
        index.insert("deep".to_string(), vec![0]);
        index.insert("learning".to_string(), vec![1, 3]);
        index.insert("for".to_string(), vec![2]);

        assert_eq!(reconstruct_abstract(&index), "deep learning for learning");
    }

    #[test]
    fn test_reconstruct_abstract_with_gap() {
        let mut index = InvertedIndex::new();
        index.insert("a".to_string(), vec![0]);
        index.insert("c".to_string(), vec![2]);

        // Position 1 is unfilled and joins as an empty string.
        assert_eq!(reconstruct_abstract(&index), "a  c");
    }

    #[test]
    fn test_reconstruct_abstract_empty() {
        assert_eq!(reconstruct_abstract(&InvertedIndex::new()), "");
    }

    #[test]
    fn test_reconstruct_abstract_drops_out_of_range_positions() {
        let mut index = InvertedIndex::new();
        index.insert("kept".to_string(), vec![0]);
        index.insert("huge".to_string(), vec![MAX_ABSTRACT_POSITION + 1]);
        index.insert("absurd".to_string(), vec![usize::MAX]);

        assert_eq!(reconstruct_abstract(&index), "kept");
    }

    #[test]
    fn test_reconstruct_abstract_all_positions_out_of_range() {
        let mut index = InvertedIndex::new();
        index.insert("gone".to_string(), vec![usize::MAX]);

        assert_eq!(reconstruct_abstract(&index), "");
    }

    #[test]
    fn test_work_deserialize_minimal() {
        let json = r#"{"id": "https://openalex.org/W1"}"#;
        let work: Work = serde_json::from_str(json).unwrap();
        assert_eq!(work.normalized_id(), "W1");
        assert!(work.display_name.is_none());
        assert!(work.authorships.is_empty());
    }

    #[test]
    fn test_work_to_paper() {
        let json = r#"{
            "id": "https://openalex.org/W42",
            "display_name": "Attention Is All You Need",
            "authorships": [
                {"author": {"id": "https://openalex.org/A1", "display_name": "Ashish Vaswani"}},
                {"author": {"id": "https://openalex.org/A2", "display_name": "Noam Shazeer"}}
            ],
            "publication_year": 2017,
            "primary_location": {"source": {"display_name": "NeurIPS"}},
            "doi": "https://doi.org/10.48550/arXiv.1706.03762",
            "cited_by_count": 100000,
            "referenced_works_count": 35,
            "abstract_inverted_index": {"Attention": [0], "works.": [1]}
        }"#;

        let work: Work = serde_json::from_str(json).unwrap();
        let paper = Paper::from(&work);

        assert_eq!(paper.id, "W42");
        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.year, Some(2017));
        assert_eq!(paper.journal, "NeurIPS");
        assert_eq!(paper.doi.as_deref(), Some("10.48550/arXiv.1706.03762"));
        assert_eq!(paper.citation_count, 100_000);
        assert_eq!(paper.abstract_text.as_deref(), Some("Attention works."));
    }

    #[test]
    fn test_work_to_paper_placeholders() {
        let work = Work { id: Some("W7".to_string()), ..Default::default() };
        let paper = Paper::from(&work);

        assert_eq!(paper.title, TITLE_UNAVAILABLE);
        assert_eq!(paper.journal, JOURNAL_UNKNOWN);
        assert!(paper.authors.is_empty());
        assert_eq!(paper.citation_count, 0);
        assert!(paper.abstract_text.is_none());
    }

    #[test]
    fn test_negative_citation_count_clamped() {
        let work = Work {
            id: Some("W8".to_string()),
            cited_by_count: Some(-3),
            ..Default::default()
        };
        assert_eq!(Paper::from(&work).citation_count, 0);
    }
}
