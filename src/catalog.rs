//! Catalog data model and the memoizing store that loads it.

use crate::error::Result;
use log::info;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
    pub breads: Vec<Bread>,
    #[serde(default)]
    pub tips: Vec<Tip>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Bread {
    pub slug: String,
    pub name: String,
    /// Name of the owning category. Not checked against `Catalog::categories`.
    pub category: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// Path of the Markdown recipe, relative to the site root.
    pub md: String,
    #[serde(default)]
    pub cover: Option<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Tip {
    pub topic: String,
    pub tip: String,
}

impl Catalog {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn category_by_slug(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn bread_by_slug(&self, slug: &str) -> Option<&Bread> {
        self.breads.iter().find(|b| b.slug == slug)
    }

    pub fn breads_in<'a>(&'a self, category: &'a Category) -> impl Iterator<Item = &'a Bread> + 'a {
        self.breads.iter().filter(move |b| b.category == category.name)
    }

    pub fn count_in(&self, category: &Category) -> usize {
        self.breads_in(category).count()
    }
}

/// Where the store gets a catalog from on first load.
#[allow(async_fn_in_trait)]
pub trait CatalogSource {
    async fn fetch_catalog(&self) -> Result<Catalog>;
}

/// Loads the catalog once and hands out the same `Arc` afterwards.
pub struct CatalogStore<S> {
    source: S,
    cached: OnceLock<Arc<Catalog>>,
}

impl<S: CatalogSource> CatalogStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cached: OnceLock::new(),
        }
    }

    pub fn get(&self) -> Option<Arc<Catalog>> {
        self.cached.get().cloned()
    }

    pub async fn load(&self) -> Result<Arc<Catalog>> {
        if let Some(catalog) = self.get() {
            return Ok(catalog);
        }
        let catalog = self.source.fetch_catalog().await?;
        info!(
            "catalog loaded: {} categories, {} breads, {} tips",
            catalog.categories.len(),
            catalog.breads.len(),
            catalog.tips.len()
        );
        // A load that raced us may have filled the cell first; keep that one.
        Ok(self.cached.get_or_init(|| Arc::new(catalog)).clone())
    }
}
