pub mod artists;
pub mod error;
pub mod forms;
pub mod shows;
pub mod venues;

use serde::Serialize;

/// Search result envelope shared by the venue and artist search endpoints.
#[derive(Debug, Serialize)]
pub struct SearchResults<T> {
    pub count: usize,
    pub data: Vec<T>,
}

/// Build the ILIKE pattern for a substring search term.
///
/// SQL LIKE wildcards and the escape character itself are escaped so user
/// input matches literally; a trailing backslash would otherwise leave the
/// pattern ending in a bare escape, which Postgres rejects. The empty term
/// produces `%%`, which matches every row; that is the documented behavior
/// of an empty search.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("fillmore"), "%fillmore%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%_live"), "%100\\%\\_live%");
    }

    #[test]
    fn test_like_pattern_escapes_trailing_backslash() {
        assert_eq!(like_pattern("trailing\\"), "%trailing\\\\%");
    }

    #[test]
    fn test_like_pattern_empty_matches_all() {
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_like_pattern_trims_whitespace() {
        assert_eq!(like_pattern("  jazz "), "%jazz%");
    }

    #[test]
    fn test_search_results_serialization() {
        let results = SearchResults {
            count: 1,
            data: vec!["The Fillmore"],
        };
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0], "The Fillmore");
    }
}
