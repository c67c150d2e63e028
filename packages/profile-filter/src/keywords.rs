//! Keyword pipeline: keep rows whose chosen column contains any listed term.
//!
//! Two lists are checked per row. Terms of the case-sensitive list must
//! appear verbatim; terms of the case-insensitive list match regardless of
//! case. A row matches when either list has a hit. Terms are literal
//! substrings, surrounding whitespace included.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::projector::Projection;

/// Executive title abbreviations searched case-sensitively by default.
pub const DEFAULT_CASE_SENSITIVE: [&str; 14] = [
    "CEO", "COO", "CFO", "CTO", "CHRO", "CMO", "CLO", "CSO", "CIO", "CTIO", "CSIO", "CCO", "CDO",
    "VP",
];

/// Yes/No column appended by [`label_keyword_matches`].
pub const MATCH_LABEL_COLUMN: &str = "Filter Criteria";

/// The two term lists of a keyword filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    pub case_sensitive: Vec<String>,
    pub case_insensitive: Vec<String>,
}

impl KeywordSet {
    pub fn new<A, B>(case_sensitive: A, case_insensitive: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            case_sensitive: case_sensitive.into_iter().map(Into::into).collect(),
            case_insensitive: case_insensitive.into_iter().map(Into::into).collect(),
        }
    }

    /// The executive-title list, case-sensitive, with no case-insensitive terms.
    pub fn defaults() -> Self {
        Self::new(DEFAULT_CASE_SENSITIVE, Vec::<String>::new())
    }

    /// True when some list holds an empty term. An empty term is a substring
    /// of every value, so such a filter keeps every non-empty row.
    pub fn has_empty_term(&self) -> bool {
        self.case_sensitive
            .iter()
            .chain(&self.case_insensitive)
            .any(String::is_empty)
    }

    /// Precompute the case-folded terms.
    pub fn matcher(&self) -> KeywordMatcher<'_> {
        KeywordMatcher {
            case_sensitive: &self.case_sensitive,
            folded: self
                .case_insensitive
                .iter()
                .map(|term| term.to_lowercase())
                .collect(),
        }
    }
}

/// Split a comma-separated user field into terms.
///
/// Only commas separate terms; spaces stay part of the term, so
/// `"CEO, VP"` yields `"CEO"` and `" VP"`. Empty input yields no terms,
/// while empty entries between commas are kept.
pub fn parse_keyword_list(input: &str) -> Vec<String> {
    if input.is_empty() {
        return Vec::new();
    }
    input.split(',').map(str::to_string).collect()
}

/// Compiled form of a [`KeywordSet`].
#[derive(Debug, Clone)]
pub struct KeywordMatcher<'a> {
    case_sensitive: &'a [String],
    folded: Vec<String>,
}

impl KeywordMatcher<'_> {
    pub fn is_match(&self, value: &str) -> bool {
        if self.case_sensitive.iter().any(|term| value.contains(term.as_str())) {
            return true;
        }
        if self.folded.is_empty() {
            return false;
        }
        let value = value.to_lowercase();
        self.folded.iter().any(|term| value.contains(term.as_str()))
    }
}

/// Per-row match flags for `column`. Absent cells never match.
pub fn match_mask(dataset: &Dataset, column: &str, keywords: &KeywordSet) -> Result<Vec<bool>> {
    let values = dataset.column_values(column)?;

    if keywords.has_empty_term() {
        warn!(column, "Keyword list contains an empty term; every non-empty value matches");
    }

    let matcher = keywords.matcher();
    Ok(values
        .map(|value| value.is_some_and(|v| matcher.is_match(v)))
        .collect())
}

/// Rows whose `column` matches either keyword list, copied verbatim.
pub fn match_keywords(dataset: &Dataset, column: &str, keywords: &KeywordSet) -> Result<Dataset> {
    let mask = match_mask(dataset, column, keywords)?;
    let filtered = dataset.select(&mask);

    debug!(
        column,
        kept = filtered.len(),
        total = dataset.len(),
        "Filtered by keywords"
    );
    Ok(filtered)
}

/// The full dataset with a [`MATCH_LABEL_COLUMN`] of `Yes`/`No` flags.
pub fn label_keyword_matches(
    dataset: &Dataset,
    column: &str,
    keywords: &KeywordSet,
) -> Result<Dataset> {
    let mask = match_mask(dataset, column, keywords)?;
    Ok(with_match_labels(dataset, &mask))
}

/// Labeled and filtered views of one keyword run.
pub fn keyword_projection(
    dataset: &Dataset,
    column: &str,
    keywords: &KeywordSet,
) -> Result<Projection> {
    let mask = match_mask(dataset, column, keywords)?;
    let labeled = with_match_labels(dataset, &mask);
    let filtered = dataset.select(&mask);

    debug!(
        column,
        kept = filtered.len(),
        total = dataset.len(),
        "Filtered by keywords"
    );
    Ok(Projection::new(labeled, filtered))
}

fn with_match_labels(dataset: &Dataset, mask: &[bool]) -> Dataset {
    let labels: Vec<Option<String>> = mask
        .iter()
        .map(|hit| {
            let label = if *hit { "Yes" } else { "No" };
            Some(label.to_string())
        })
        .collect();

    dataset.clone().set_column(MATCH_LABEL_COLUMN, labels)
}
