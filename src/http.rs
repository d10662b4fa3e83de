use crate::catalog::{Catalog, CatalogSource};
use crate::error::{Error, Result};
use gloo_net::http::Request;
use log::debug;
use web_sys::RequestCache;

/// GETs `url` bypassing the HTTP cache and returns the body as text.
pub async fn fetch_text(url: &str) -> Result<String> {
    let resp = Request::get(url)
        .cache(RequestCache::NoStore)
        .send()
        .await
        .map_err(|e| Error::network(url, e))?;
    if !resp.ok() {
        return Err(Error::Status {
            url: url.to_string(),
            status: resp.status(),
        });
    }
    let text = resp.text().await.map_err(|e| Error::body(url, e))?;
    debug!("fetched {url}");
    Ok(text)
}

/// Catalog JSON served next to the app.
pub struct HttpCatalog {
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl CatalogSource for HttpCatalog {
    async fn fetch_catalog(&self) -> Result<Catalog> {
        let text = fetch_text(&self.url).await?;
        Catalog::from_json(&text)
    }
}
