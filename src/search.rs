//! Search functionality for filtering prompt suggestions.
//!
//! This module encapsulates the search/matching logic, allowing the underlying
//! implementation to be changed without affecting the rest of the codebase.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// A matcher for fuzzy searching text.
///
/// This wraps the underlying fuzzy matching implementation, providing a simple
/// interface that can be used throughout the application.
pub struct Matcher {
    inner: SkimMatcherV2,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher {
    /// Create a new matcher instance.
    pub fn new() -> Self {
        Self {
            inner: SkimMatcherV2::default(),
        }
    }

    /// Check if the text matches the pattern using fuzzy matching.
    ///
    /// Returns `true` if the pattern fuzzy-matches the text.
    /// The matching is case-insensitive and allows non-consecutive characters.
    /// An empty pattern matches everything.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let matcher = Matcher::new();
    /// assert!(matcher.matches("3. payments-prod", "pprod"));
    /// assert!(!matcher.matches("hello", "xyz"));
    /// ```
    pub fn matches(&self, text: &str, pattern: &str) -> bool {
        if pattern.is_empty() {
            return true;
        }
        // Convert pattern to lowercase for case-insensitive matching
        let pattern_lower = pattern.to_lowercase();
        self.inner.fuzzy_match(text, &pattern_lower).is_some()
    }

    /// Keep the items whose text matches the pattern, in their original order.
    pub fn filter<'a, T, F>(&self, items: &'a [T], pattern: &str, text: F) -> Vec<&'a T>
    where
        F: Fn(&T) -> &str,
    {
        items
            .iter()
            .filter(|item| self.matches(text(item), pattern))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzzy_match() {
        let matcher = Matcher::new();

        // Basic fuzzy matching
        assert!(matcher.matches("1. api-gateway", "apgw"));
        assert!(matcher.matches("12. payments-prod", "pprod"));

        // Exact match
        assert!(matcher.matches("2. staging", "2. staging"));

        // Case-insensitive
        assert!(matcher.matches("3. STAGING", "stg"));
        assert!(matcher.matches("3. staging", "STG"));

        // No match
        assert!(!matcher.matches("hello", "xyz"));
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let matcher = Matcher::new();
        assert!(matcher.matches("1. anything", ""));
    }

    #[test]
    fn test_filter_keeps_order_and_subset() {
        let matcher = Matcher::new();
        let items = vec!["1. prod-eu", "2. staging", "3. prod-us", "4. dev"];

        let filtered = matcher.filter(&items, "prod", |s| *s);

        assert_eq!(filtered, vec![&"1. prod-eu", &"3. prod-us"]);
        assert_eq!(matcher.filter(&items, "prod", |s| *s), filtered);
        assert_eq!(matcher.filter(&items, "", |s| *s).len(), items.len());
    }
}
