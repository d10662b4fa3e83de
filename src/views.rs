//! View models built from the catalog, one per route. Everything here is
//! plain data so the mapping to markup in `pages` stays trivial.

use crate::catalog::{Bread, Catalog, Category, Tip};
use crate::config::SiteConfig;
use crate::router::{bread_href, category_href};
use crate::search::search;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;

const DEFAULT_CATEGORY_BLURB: &str = "Panadería casera y tradición";
const DEFAULT_BREAD_BLURB: &str = "Pan casero";

/// Characters that would end a quoted CSS `url(...)` early.
const CSS_URL: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'\\');

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCard {
    pub name: String,
    pub href: String,
    pub description: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreadCard {
    pub slug: String,
    pub name: String,
    pub href: String,
    pub category: String,
    pub summary: String,
    pub cover: Option<String>,
    /// Recipe path, used to look for a cover image when `cover` is empty.
    pub md: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HomeModel {
    pub featured: Vec<CategoryCard>,
    pub latest: Vec<BreadCard>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryDetail {
    pub name: String,
    pub description: String,
    pub breads: Vec<BreadCard>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BreadDetail {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub category_href: String,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub md: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<BreadCard>,
}

fn category_card(catalog: &Catalog, category: &Category) -> CategoryCard {
    CategoryCard {
        name: category.name.clone(),
        href: category_href(&category.slug),
        description: category
            .description
            .clone()
            .unwrap_or_else(|| DEFAULT_CATEGORY_BLURB.to_string()),
        count: catalog.count_in(category),
    }
}

fn bread_card(bread: &Bread) -> BreadCard {
    BreadCard {
        slug: bread.slug.clone(),
        name: bread.name.clone(),
        href: bread_href(&bread.slug),
        category: bread.category.clone(),
        summary: bread
            .summary
            .clone()
            .unwrap_or_else(|| DEFAULT_BREAD_BLURB.to_string()),
        cover: bread.cover.clone(),
        md: bread.md.clone(),
    }
}

/// The last `n` items in catalog order, newest first.
pub fn latest<T>(items: &[T], n: usize) -> impl Iterator<Item = &T> {
    items[items.len().saturating_sub(n)..].iter().rev()
}

pub fn home(catalog: &Catalog, config: &SiteConfig) -> HomeModel {
    let mut shown: Vec<&Category> = catalog.categories.iter().collect();
    if config.featured_only && shown.iter().any(|c| c.featured) {
        shown.retain(|c| c.featured);
    }
    let mut featured: Vec<CategoryCard> =
        shown.iter().map(|c| category_card(catalog, c)).collect();
    featured.sort_by(|a, b| b.count.cmp(&a.count));

    let names: Vec<&str> = shown.iter().map(|c| c.name.as_str()).collect();
    let pool: Vec<&Bread> = catalog
        .breads
        .iter()
        .filter(|b| names.contains(&b.category.as_str()))
        .collect();
    let latest = latest(&pool, config.latest_count)
        .map(|b| bread_card(b))
        .collect();

    HomeModel { featured, latest }
}

pub fn categories(catalog: &Catalog) -> Vec<CategoryCard> {
    catalog
        .categories
        .iter()
        .map(|c| category_card(catalog, c))
        .collect()
}

pub fn category_detail(catalog: &Catalog, slug: &str) -> Option<CategoryDetail> {
    let category = catalog.category_by_slug(slug)?;
    Some(CategoryDetail {
        name: category.name.clone(),
        description: category.description.clone().unwrap_or_default(),
        breads: catalog.breads_in(category).map(bread_card).collect(),
    })
}

pub fn bread_detail(catalog: &Catalog, slug: &str) -> Option<BreadDetail> {
    let bread = catalog.bread_by_slug(slug)?;
    let category_slug = catalog
        .category_by_name(&bread.category)
        .map(|c| c.slug.as_str())
        .unwrap_or_default();
    Some(BreadDetail {
        slug: bread.slug.clone(),
        name: bread.name.clone(),
        category: bread.category.clone(),
        category_href: category_href(category_slug),
        summary: bread.summary.clone().filter(|s| !s.is_empty()),
        tags: bread.tags.clone(),
        source: bread.source.clone().filter(|s| !s.is_empty()),
        md: bread.md.clone(),
    })
}

pub fn tips(catalog: &Catalog) -> Vec<Tip> {
    catalog.tips.clone()
}

pub fn search_results(catalog: &Catalog, query: &str) -> SearchOutcome {
    SearchOutcome {
        query: query.trim().to_string(),
        results: search(catalog, query).into_iter().map(bread_card).collect(),
    }
}

/// Cards that still need a cover, capped at `limit`.
pub fn missing_covers(cards: &[BreadCard], limit: usize) -> Vec<(String, String)> {
    cards
        .iter()
        .filter(|c| c.cover.is_none())
        .take(limit)
        .map(|c| (c.slug.clone(), c.md.clone()))
        .collect()
}

pub fn apply_covers(cards: &mut [BreadCard], covers: &HashMap<String, String>) {
    for card in cards.iter_mut().filter(|c| c.cover.is_none()) {
        card.cover = covers.get(&card.slug).cloned();
    }
}

/// Inline style painting `url` as a card background.
pub fn cover_style(url: &str) -> String {
    format!(
        "background-image: url('{}'); background-size: cover;",
        utf8_percent_encode(url, CSS_URL)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{bread, category, sample};

    fn names(cards: &[BreadCard]) -> Vec<&str> {
        cards.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn latest_is_last_n_reversed() {
        let items = ["A", "B", "C", "D"];
        assert_eq!(latest(&items, 2).copied().collect::<Vec<_>>(), vec!["D", "C"]);
        assert_eq!(latest(&items, 10).count(), 4);
        assert_eq!(latest(&items, 0).count(), 0);
    }

    #[test]
    fn category_counts_match_catalog() {
        let catalog = sample();
        for card in categories(&catalog) {
            let expected = catalog
                .breads
                .iter()
                .filter(|b| b.category == card.name)
                .count();
            assert_eq!(card.count, expected, "{}", card.name);
        }
    }

    #[test]
    fn category_card_defaults_description() {
        let cards = categories(&sample());
        assert_eq!(cards[0].description, "Panadería casera y tradición");
        assert_eq!(cards[1].description, "Fermentación lenta");
        assert_eq!(cards[1].href, "#/categoria/masa-madre");
    }

    #[test]
    fn home_shows_featured_sorted_by_count() {
        let model = home(&sample(), &SiteConfig::default());
        let featured: Vec<_> = model.featured.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(featured, vec!["Masa madre", "Panes de molde"]);
        // Dulces is not featured, so its breads stay off the home page.
        assert_eq!(names(&model.latest), vec!["Hogaza rústica", "Pan de molde", "Pan Francés"]);
    }

    #[test]
    fn home_ties_keep_catalog_order() {
        let catalog = Catalog {
            categories: vec![category("A", "a", true), category("B", "b", true)],
            breads: vec![bread("b1", "B1", "B"), bread("a1", "A1", "A")],
            tips: vec![],
        };
        let model = home(&catalog, &SiteConfig::default());
        let featured: Vec<_> = model.featured.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(featured, vec!["A", "B"]);
    }

    #[test]
    fn home_without_featured_uses_all_categories() {
        let catalog = Catalog {
            categories: vec![category("A", "a", false), category("B", "b", false)],
            breads: vec![
                bread("a1", "A1", "A"),
                bread("b1", "B1", "B"),
                bread("b2", "B2", "B"),
                bread("c1", "C1", "C"),
            ],
            tips: vec![],
        };
        let config = SiteConfig {
            latest_count: 2,
            ..SiteConfig::default()
        };
        let model = home(&catalog, &config);
        assert_eq!(model.featured[0].name, "B");
        assert_eq!(names(&model.latest), vec!["B2", "B1"]);
    }

    #[test]
    fn category_detail_lists_matching_breads() {
        let catalog = sample();
        let detail = category_detail(&catalog, "masa-madre").unwrap();
        assert_eq!(detail.name, "Masa madre");
        assert_eq!(names(&detail.breads), vec!["Pan Francés", "Hogaza rústica"]);
        assert!(category_detail(&catalog, "nada").is_none());
    }

    #[test]
    fn bread_detail_links_back_to_category() {
        let catalog = sample();
        let detail = bread_detail(&catalog, "hogaza").unwrap();
        assert_eq!(detail.category_href, "#/categoria/masa-madre");
        assert_eq!(detail.source.as_deref(), Some("Receta familiar"));
        assert_eq!(detail.md, "content/recipes/hogaza.md");

        let orphan = bread_detail(&catalog, "huerfano").unwrap();
        assert_eq!(orphan.category_href, "#/categoria/");
        assert!(bread_detail(&catalog, "nada").is_none());
    }

    #[test]
    fn bread_card_defaults_summary() {
        let detail = category_detail(&sample(), "molde").unwrap();
        assert_eq!(detail.breads[0].summary, "Pan casero");
        assert_eq!(detail.breads[0].href, "#/pan/pan-de-molde");
    }

    #[test]
    fn search_outcome_keeps_trimmed_query() {
        let outcome = search_results(&sample(), "  pan frances ");
        assert_eq!(outcome.query, "pan frances");
        assert_eq!(names(&outcome.results), vec!["Pan Francés"]);
    }

    #[test]
    fn covers_fill_only_missing_cards() {
        let mut cards: Vec<BreadCard> = sample().breads.iter().map(bread_card).collect();
        cards[1].cover = Some("img/propia.jpg".to_string());
        let wanted = missing_covers(&cards, 2);
        assert_eq!(wanted.len(), 2);
        assert_eq!(wanted[0].0, "pan-frances");
        assert_eq!(wanted[1].0, "hogaza");

        let covers = HashMap::from([
            ("pan-frances".to_string(), "img/frances.jpg".to_string()),
            ("pan-de-molde".to_string(), "img/otra.jpg".to_string()),
        ]);
        apply_covers(&mut cards, &covers);
        assert_eq!(cards[0].cover.as_deref(), Some("img/frances.jpg"));
        assert_eq!(cards[1].cover.as_deref(), Some("img/propia.jpg"));
        assert_eq!(cards[2].cover, None);
    }

    #[test]
    fn cover_style_cannot_break_out_of_url() {
        assert_eq!(
            cover_style("img/conchas.jpg"),
            "background-image: url('img/conchas.jpg'); background-size: cover;"
        );
        let style = cover_style("img/a');color:red;('.jpg");
        assert!(style.starts_with("background-image: url('img/a%27%29;color:red;%28%27.jpg');"));
        assert_eq!(style.matches('\'').count(), 2);
    }
}
