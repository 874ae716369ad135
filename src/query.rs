//! Free-text inventory search.
//!
//! A query is split on whitespace into terms. A name matches the query when
//! every term occurs somewhere in it, ignoring case. Terms are plain text:
//! `(`, `.` or `*` match themselves and nothing else.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    terms: Vec<String>,
}

impl Query {
    pub fn empty() -> Query {
        Query { terms: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matches(&self, name: &str) -> bool {
        matches_all_terms(&self.terms, name)
    }

    /// Keeps the candidates matching every term, in candidate order.
    pub fn filter<'a, I>(&self, candidates: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        candidates
            .into_iter()
            .filter(|name| self.matches(name))
            .collect()
    }
}

/// Runs `query` against `candidates` and returns the matching names in
/// candidate order.
pub fn search<'a, I>(query: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    Query::from(query).filter(candidates)
}

fn matches_all_terms(terms: &[String], text: &str) -> bool {
    if terms.is_empty() {
        true
    } else {
        let text = fold_case(text);
        terms.iter().all(|term| text.contains(term.as_str()))
    }
}

/// Lowercases char by char. `str::to_lowercase` turns a word-final `Σ` into
/// `ς`, which would stop a term from matching inside a longer name.
fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        // terms are stored folded so matching only lowercases the candidate
        let terms = text
            .split_whitespace()
            .map(fold_case)
            .collect();
        Self { terms }
    }
}

impl From<String> for Query {
    fn from(text: String) -> Self {
        Query::from(text.as_str())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const INVENTORY: [&str; 9] = [
        "Apple iPhone 14",
        "Samsung Galaxy S23",
        "Google Pixel 7",
        "Sony Xperia 5",
        "Apple Watch Series 8",
        "Samsung Smart TV",
        "iPhone 14 Pro",
        "Apple MacBook Air",
        "Samsung Galaxy Buds",
    ];

    #[test]
    fn tokenizes_on_whitespace_runs() {
        let query = Query::from("  Apple\t Watch\n");
        assert_eq!(query.terms(), &["apple".to_string(), "watch".to_string()]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn blank_query_has_no_terms(#[case] text: &str) {
        assert!(Query::from(text).is_empty());
        assert_eq!(search(text, INVENTORY), INVENTORY.to_vec());
    }

    #[rstest]
    #[case("Apple Watch", vec!["Apple Watch Series 8"])]
    #[case("Galaxy", vec!["Samsung Galaxy S23", "Samsung Galaxy Buds"])]
    #[case("iPhone", vec!["Apple iPhone 14", "iPhone 14 Pro"])]
    #[case("Apple", vec!["Apple iPhone 14", "Apple Watch Series 8", "Apple MacBook Air"])]
    #[case("Samsung Smart", vec!["Samsung Smart TV"])]
    #[case("nonexistent product", vec![])]
    fn finds_items_containing_every_term(#[case] query: &str, #[case] expected: Vec<&str>) {
        assert_eq!(search(query, INVENTORY), expected);
    }

    #[test]
    fn conjunction_is_not_disjunction() {
        let candidates = ["Apple Watch Series 8", "Apple iPhone 14", "Watch Dog Game"];
        assert_eq!(search("Apple Watch", candidates), vec!["Apple Watch Series 8"]);
    }

    #[test]
    fn terms_need_not_be_adjacent() {
        assert_eq!(
            search("Series Apple", ["Apple Watch Series 8"]),
            vec!["Apple Watch Series 8"]
        );
    }

    #[test]
    fn matches_inside_words() {
        assert_eq!(search("Phone", ["iPhone 14", "Pixel"]), vec!["iPhone 14"]);
    }

    #[test]
    fn ignores_case_on_both_sides() {
        assert_eq!(search("APPLE", INVENTORY), search("apple", INVENTORY));
        assert!(Query::from("sMaRt tv").matches("SAMSUNG SMART TV"));
    }

    #[rstest]
    #[case("ΑΣ", "ΑΣΒ")]
    #[case("ΟΔΟΣ", "ΟΔΟΣΤΡΩΤΗΡΑΣ")]
    #[case("σ", "ΚΑΦΕΣ")]
    #[case("Ärger", "ÄRGERNIS")]
    fn folds_non_ascii_without_context(#[case] term: &str, #[case] name: &str) {
        assert_eq!(search(term, [name]), vec![name]);
    }

    #[test]
    fn metacharacters_are_literal() {
        let candidates = ["Refurb iPhone (2022) 128GB", "iPhone 13"];
        assert_eq!(
            search("iPhone (2022)", candidates),
            vec!["Refurb iPhone (2022) 128GB"]
        );
        assert_eq!(search(".*", ["Cable 1.5m", "Cable .* edition"]), vec!["Cable .* edition"]);
        assert_eq!(search("(a+)+$", ["aaaaaaaaaaaaaaaaaaaaaaaa!"]), Vec::<&str>::new());
    }

    #[test]
    fn no_candidates_no_results() {
        assert!(search("apple", Vec::<&str>::new()).is_empty());
        assert!(search("", Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn repeated_searches_agree() {
        let query = Query::from("samsung");
        assert_eq!(query.filter(INVENTORY), query.filter(INVENTORY));
    }
}
