//! Query composition over the OpenAlex graph.
//!
//! Deterministically maps user intent (query text + filter selections) to
//! upstream request descriptors, and implements the three citation-graph
//! derived modes: citing, referenced-by (locally paginated), and the
//! set-intersection modes citing-all / references-all.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::client::OpenAlexClient;
use crate::config::limits;
use crate::models::{FilterSet, Paper, SortKey, normalize_id};

/// One conjunctive filter clause: `field:value1|value2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause {
    /// Upstream filter field.
    pub field: &'static str,

    /// Alternative values, `|`-joined when rendered.
    pub values: Vec<String>,
}

impl FilterClause {
    /// Build a clause, returning `None` for an empty value list so empty
    /// selections never emit empty clauses.
    fn new(field: &'static str, values: Vec<String>) -> Option<Self> {
        if values.is_empty() { None } else { Some(Self { field, values }) }
    }

    fn render(&self) -> String {
        format!("{}:{}", self.field, self.values.join("|"))
    }
}

/// A fully composed upstream search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Conjunctive filter clauses.
    pub filter_clauses: Vec<FilterClause>,

    /// Free-text search terms.
    pub search: Option<String>,

    /// Upstream sort parameter (`None` = relevance, the API default).
    pub sort: Option<&'static str>,

    /// 1-indexed page.
    pub page: usize,

    /// Page size.
    pub per_page: usize,
}

impl RequestDescriptor {
    /// Render the `filter=` parameter, or `None` when there are no clauses.
    #[must_use]
    pub fn filter_param(&self) -> Option<String> {
        if self.filter_clauses.is_empty() {
            return None;
        }
        Some(
            self.filter_clauses
                .iter()
                .map(FilterClause::render)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Same descriptor pointed at another page.
    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }
}

/// Outcome of composing a derived-set query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposedQuery {
    /// A request worth issuing.
    Request(RequestDescriptor),

    /// The derived set is empty; no request should be issued.
    Empty,
}

/// One page of search results, reshaped into local papers.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    /// Total matching records upstream.
    pub total: i64,

    /// Papers in this page.
    pub results: Vec<Paper>,
}

/// One locally sliced page of a paper's outbound references.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePage {
    /// Length of the full reference-id list.
    pub total: usize,

    /// Papers in this page, in reference-list order.
    pub results: Vec<Paper>,
}

/// Build a filtered/sorted/paginated search descriptor.
///
/// The sort parameter is omitted entirely for [`SortKey::Relevance`], and
/// empty filter selections contribute no clause.
#[must_use]
pub fn compose_search(
    query: &str,
    filters: &FilterSet,
    sort: SortKey,
    page: usize,
) -> RequestDescriptor {
    let mut clauses = Vec::new();

    clauses.extend(FilterClause::new(
        "primary_location.source.issn",
        filters.journals.iter().map(|j| j.issn.clone()).collect(),
    ));
    clauses.extend(FilterClause::new(
        "authorships.author.id",
        filters.authors.iter().map(|a| a.id.clone()).collect(),
    ));
    clauses.extend(FilterClause::new(
        "topics.id",
        filters.topics.iter().map(|t| t.id.clone()).collect(),
    ));
    clauses.extend(FilterClause::new(
        "authorships.institutions.id",
        filters.institutions.iter().map(|i| i.id.clone()).collect(),
    ));
    clauses.extend(
        filters.publication_type.clone().and_then(|t| FilterClause::new("type", vec![t])),
    );
    clauses.extend(
        filters.from_date.clone().and_then(|d| FilterClause::new("from_publication_date", vec![d])),
    );
    clauses.extend(
        filters.to_date.clone().and_then(|d| FilterClause::new("to_publication_date", vec![d])),
    );

    let trimmed = query.trim();
    RequestDescriptor {
        filter_clauses: clauses,
        search: if trimmed.is_empty() { None } else { Some(trimmed.to_string()) },
        sort: sort.sort_param(),
        page: page.max(1),
        per_page: limits::PAGE_SIZE,
    }
}

/// Build a descriptor for works whose citation list includes `paper_id`.
#[must_use]
pub fn compose_citing_of(paper_id: &str, page: usize) -> RequestDescriptor {
    RequestDescriptor {
        filter_clauses: vec![FilterClause {
            field: "cites",
            values: vec![normalize_id(paper_id)],
        }],
        search: None,
        sort: None,
        page: page.max(1),
        per_page: limits::PAGE_SIZE,
    }
}

/// Intersect a collection of id sets.
///
/// Fold order is irrelevant: the result equals the mathematical intersection
/// for any permutation of the input. An empty collection yields the empty set.
#[must_use]
pub fn intersect_ids(sets: &[HashSet<String>]) -> HashSet<String> {
    let Some((first, rest)) = sets.split_first() else {
        return HashSet::new();
    };

    rest.iter().fold(first.clone(), |acc, set| acc.intersection(set).cloned().collect())
}

/// Executes composed queries and the citation-graph derived modes.
///
/// Holds the graph client by handle; constructed once at startup and passed
/// to consumers explicitly.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    client: Arc<OpenAlexClient>,
}

impl QueryComposer {
    /// Create a composer over the given client.
    #[must_use]
    pub fn new(client: Arc<OpenAlexClient>) -> Self {
        Self { client }
    }

    /// Execute a composed query, degrading upstream failure to an empty page.
    ///
    /// A single failed fetch surfaces as "no results", never as an error:
    /// the user re-triggers the search to retry.
    pub async fn execute(&self, query: &ComposedQuery) -> SearchPage {
        let ComposedQuery::Request(descriptor) = query else {
            return SearchPage::default();
        };

        let result = self
            .client
            .search_works(
                descriptor.filter_param().as_deref(),
                descriptor.search.as_deref(),
                descriptor.sort,
                descriptor.page,
                descriptor.per_page,
            )
            .await;

        match result {
            Ok(page) => SearchPage {
                total: page.meta.count,
                results: page.results.iter().map(Paper::from).collect(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "search degraded to empty result");
                SearchPage::default()
            }
        }
    }

    /// Locally paginated view of a paper's outbound references.
    ///
    /// The upstream item carries the full reference-id list; this slices
    /// `[(page-1)*20 .. page*20]` and batch-fetches exactly that slice.
    /// An empty reference list yields `{results: [], total: 0}` without a
    /// page fetch. Slicing is deterministic for a fixed list and page.
    pub async fn referenced_by(&self, paper_id: &str, page: usize) -> ReferencePage {
        let work = match self.client.get_work(paper_id).await {
            Ok(work) => work,
            Err(err) => {
                tracing::warn!(paper_id, error = %err, "reference lookup failed");
                return ReferencePage::default();
            }
        };

        let refs = work.referenced_works;
        let total = refs.len();
        if total == 0 {
            return ReferencePage { total: 0, results: Vec::new() };
        }

        let start = (page.max(1) - 1) * limits::PAGE_SIZE;
        if start >= total {
            return ReferencePage { total, results: Vec::new() };
        }
        let end = (start + limits::PAGE_SIZE).min(total);
        let slice = &refs[start..end];

        match self.client.get_works_by_ids(slice).await {
            Ok(works) => {
                // Batch responses come back in upstream order; restore list order.
                let mut by_id: HashMap<String, Paper> =
                    works.iter().map(|w| (w.normalized_id(), Paper::from(w))).collect();
                let results = slice.iter().filter_map(|id| by_id.remove(id)).collect();
                ReferencePage { total, results }
            }
            Err(err) => {
                tracing::warn!(paper_id, error = %err, "reference page fetch failed");
                ReferencePage { total, results: Vec::new() }
            }
        }
    }

    /// Compose a query for works citing *every* paper in `paper_ids`.
    ///
    /// Each leg prefetches up to [`limits::INTERSECT_PREFETCH`] citing ids;
    /// legs run concurrently and are all awaited before intersecting. A
    /// failed leg degrades to the empty set, which empties the whole
    /// intersection ("no constraint satisfied", not "skip this leg").
    ///
    /// Callers must supply at least two ids; fewer is unguarded here.
    pub async fn citing_all(&self, paper_ids: &[String]) -> ComposedQuery {
        let legs = paper_ids.iter().map(|id| self.citing_leg(id));
        let sets: Vec<HashSet<String>> = futures::future::join_all(legs).await;
        Self::membership_query(&intersect_ids(&sets))
    }

    /// Compose a query for references common to *every* paper in `paper_ids`.
    ///
    /// Same contract as [`Self::citing_all`], with each leg being a paper's
    /// full outbound reference-id list.
    pub async fn references_all(&self, paper_ids: &[String]) -> ComposedQuery {
        let legs = paper_ids.iter().map(|id| self.reference_leg(id));
        let sets: Vec<HashSet<String>> = futures::future::join_all(legs).await;
        Self::membership_query(&intersect_ids(&sets))
    }

    async fn citing_leg(&self, paper_id: &str) -> HashSet<String> {
        match self.client.get_citing_ids(paper_id, limits::INTERSECT_PREFETCH).await {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                tracing::warn!(paper_id, error = %err, "citing leg degraded to empty set");
                HashSet::new()
            }
        }
    }

    async fn reference_leg(&self, paper_id: &str) -> HashSet<String> {
        match self.client.get_work(paper_id).await {
            Ok(work) => work.referenced_works.into_iter().collect(),
            Err(err) => {
                tracing::warn!(paper_id, error = %err, "reference leg degraded to empty set");
                HashSet::new()
            }
        }
    }

    /// Turn a surviving id set into an id-membership descriptor.
    ///
    /// Ids are sorted so the descriptor is identical for any input
    /// permutation.
    fn membership_query(ids: &HashSet<String>) -> ComposedQuery {
        if ids.is_empty() {
            return ComposedQuery::Empty;
        }

        let mut members: Vec<String> = ids.iter().cloned().collect();
        members.sort_unstable();

        ComposedQuery::Request(RequestDescriptor {
            filter_clauses: vec![FilterClause { field: "openalex_id", values: members }],
            search: None,
            sort: None,
            page: 1,
            per_page: limits::PAGE_SIZE,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorFilter, JournalFilter};

    fn set(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_compose_search_no_filters_no_clauses() {
        let descriptor = compose_search("cats", &FilterSet::default(), SortKey::Relevance, 1);
        assert!(descriptor.filter_clauses.is_empty());
        assert_eq!(descriptor.filter_param(), None);
        assert_eq!(descriptor.search.as_deref(), Some("cats"));
        assert_eq!(descriptor.per_page, 20);
    }

    #[test]
    fn test_compose_search_omits_relevance_sort() {
        let descriptor = compose_search("q", &FilterSet::default(), SortKey::Relevance, 1);
        assert_eq!(descriptor.sort, None);

        let descriptor = compose_search("q", &FilterSet::default(), SortKey::DateDesc, 1);
        assert_eq!(descriptor.sort, Some("publication_date:desc"));
    }

    #[test]
    fn test_compose_search_renders_conjunctive_clauses() {
        let mut filters = FilterSet::default();
        filters
            .add_journal(JournalFilter { issn: "0028-0836".into(), name: "Nature".into() })
            .unwrap();
        filters
            .add_journal(JournalFilter { issn: "0036-8075".into(), name: "Science".into() })
            .unwrap();
        filters.add_author(AuthorFilter { id: "A5".into(), name: "Ada".into() });
        filters.from_date = Some("2020-01-01".into());

        let descriptor = compose_search("", &filters, SortKey::Relevance, 2);
        assert_eq!(
            descriptor.filter_param().unwrap(),
            "primary_location.source.issn:0028-0836|0036-8075,\
             authorships.author.id:A5,\
             from_publication_date:2020-01-01"
        );
        assert_eq!(descriptor.search, None);
        assert_eq!(descriptor.page, 2);
    }

    #[test]
    fn test_compose_citing_of_normalizes_id() {
        let descriptor = compose_citing_of("https://openalex.org/W9", 1);
        assert_eq!(descriptor.filter_param().unwrap(), "cites:W9");
    }

    #[test]
    fn test_page_clamped_to_one() {
        let descriptor = compose_search("q", &FilterSet::default(), SortKey::Relevance, 0);
        assert_eq!(descriptor.page, 1);
    }

    #[test]
    fn test_intersect_ids_basic() {
        let result = intersect_ids(&[set(&["X", "Y", "Z"]), set(&["Y", "Z", "W"])]);
        assert_eq!(result, set(&["Y", "Z"]));
    }

    #[test]
    fn test_intersect_ids_order_independent() {
        let a = intersect_ids(&[set(&["A", "B"]), set(&["B", "C"]), set(&["B"])]);
        let b = intersect_ids(&[set(&["B"]), set(&["B", "C"]), set(&["A", "B"])]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_intersect_with_empty_leg_is_empty() {
        let result = intersect_ids(&[set(&["A", "B"]), HashSet::new()]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_membership_query_sorted_and_sentinel() {
        assert_eq!(QueryComposer::membership_query(&HashSet::new()), ComposedQuery::Empty);

        let ComposedQuery::Request(descriptor) =
            QueryComposer::membership_query(&set(&["W3", "W1", "W2"]))
        else {
            panic!("expected a request");
        };
        assert_eq!(descriptor.filter_param().unwrap(), "openalex_id:W1|W2|W3");
    }
}
