//! Category index derived from the quote sequence.
//!
//! # Responsibility
//! - List distinct categories in first-occurrence order.
//! - Derive filter options and resolve a restored filter against them.
//!
//! # Invariants
//! - Results always reflect the sequence passed in; nothing is cached.

use crate::model::filter::CategoryFilter;
use crate::model::quote::Quote;
use std::collections::HashSet;

/// Returns distinct categories in the order they first appear.
pub fn categories(quotes: &[Quote]) -> Vec<String> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .filter(|quote| seen.insert(quote.category.as_str()))
        .map(|quote| quote.category.clone())
        .collect()
}

/// Returns the filter choices: `All` followed by each category.
pub fn filter_options(quotes: &[Quote]) -> Vec<CategoryFilter> {
    std::iter::once(CategoryFilter::All)
        .chain(categories(quotes).into_iter().map(CategoryFilter::Category))
        .collect()
}

/// Keeps `saved` when its category still exists in `quotes`, else `All`.
pub fn resolve_filter(saved: &CategoryFilter, quotes: &[Quote]) -> CategoryFilter {
    match saved {
        CategoryFilter::All => CategoryFilter::All,
        CategoryFilter::Category(name) => {
            if quotes.iter().any(|quote| quote.category == *name) {
                saved.clone()
            } else {
                CategoryFilter::All
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{categories, filter_options, resolve_filter};
    use crate::model::filter::CategoryFilter;
    use crate::model::quote::Quote;

    fn sample() -> Vec<Quote> {
        vec![
            Quote::unchecked("a", "X"),
            Quote::unchecked("b", "Y"),
            Quote::unchecked("c", "X"),
        ]
    }

    #[test]
    fn categories_keep_first_occurrence_order() {
        assert_eq!(categories(&sample()), vec!["X", "Y"]);
        assert!(categories(&[]).is_empty());
    }

    #[test]
    fn filter_options_start_with_all() {
        assert_eq!(
            filter_options(&sample()),
            vec![
                CategoryFilter::All,
                CategoryFilter::Category("X".to_string()),
                CategoryFilter::Category("Y".to_string()),
            ]
        );
    }

    #[test]
    fn resolve_filter_drops_vanished_category() {
        let quotes = sample();
        let kept = CategoryFilter::parse("Y");
        assert_eq!(resolve_filter(&kept, &quotes), kept);
        assert_eq!(
            resolve_filter(&CategoryFilter::parse("Z"), &quotes),
            CategoryFilter::All
        );
    }
}
