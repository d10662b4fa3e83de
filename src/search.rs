use crate::catalog::{Bread, Catalog};
use unicode_normalization::UnicodeNormalization;

/// Lowercases and strips combining diacritics (U+0300..=U+036F) after NFD.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

fn haystack(bread: &Bread) -> String {
    let mut fields = vec![bread.name.as_str()];
    if let Some(summary) = &bread.summary {
        fields.push(summary);
    }
    fields.push(&bread.category);
    fields.extend(bread.tags.iter().map(String::as_str));
    normalize(&fields.join(" "))
}

/// Breads whose name, summary, category or tags contain `query`, in catalog order.
pub fn search<'a>(catalog: &'a Catalog, query: &str) -> Vec<&'a Bread> {
    let needle = normalize(query.trim());
    catalog
        .breads
        .iter()
        .filter(|bread| haystack(bread).contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample;

    fn names<'a>(found: &[&'a Bread]) -> Vec<&'a str> {
        found.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn strips_accents_and_case() {
        assert_eq!(normalize("Pan Francés"), "pan frances");
        assert_eq!(normalize("ÑOQUI"), "noqui");
    }

    #[test]
    fn accent_insensitive_match() {
        let catalog = sample();
        assert_eq!(names(&search(&catalog, "pan frances")), vec!["Pan Francés"]);
        assert_eq!(names(&search(&catalog, "  PAN FRANCÉS ")), vec!["Pan Francés"]);
    }

    #[test]
    fn matches_summary_category_and_tags() {
        let catalog = sample();
        assert_eq!(names(&search(&catalog, "mexicano")), vec!["Conchas"]);
        assert_eq!(
            names(&search(&catalog, "masa madre")),
            vec!["Pan Francés", "Hogaza rústica"]
        );
        assert_eq!(names(&search(&catalog, "rustico")), vec!["Hogaza rústica"]);
    }

    #[test]
    fn no_results_is_empty() {
        assert!(search(&sample(), "baguette de centeno").is_empty());
    }
}
