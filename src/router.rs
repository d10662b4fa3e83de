//! Hash router: `#/pan/:slug#anchor` style locations mapped onto pages.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Categories,
    Category,
    Bread,
    Tips,
    About,
}

pub struct RouteDef {
    pub pattern: &'static str,
    pub page: Page,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub page: Page,
    pub params: HashMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or_default()
    }
}

/// A location hash split into the routed path and an optional in-page anchor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashLocation {
    pub path: String,
    pub anchor: Option<String>,
}

pub fn parse_hash(raw: &str) -> HashLocation {
    let trimmed = raw.strip_prefix('#').unwrap_or(raw);
    let (path, anchor) = match trimmed.split_once('#') {
        Some((path, anchor)) => (path, Some(anchor).filter(|a| !a.is_empty())),
        None => (trimmed, None),
    };
    HashLocation {
        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
        anchor: anchor.map(decode_segment),
    }
}

pub struct Router {
    routes: Vec<RouteDef>,
}

impl Router {
    pub fn new(routes: Vec<RouteDef>) -> Self {
        Self { routes }
    }

    /// The site's route table, in match order.
    pub fn site() -> Self {
        Self::new(vec![
            RouteDef { pattern: "/", page: Page::Home },
            RouteDef { pattern: "/categorias", page: Page::Categories },
            RouteDef { pattern: "/categoria/:slug", page: Page::Category },
            RouteDef { pattern: "/pan/:slug", page: Page::Bread },
            RouteDef { pattern: "/consejos", page: Page::Tips },
            RouteDef { pattern: "/acerca", page: Page::About },
        ])
    }

    /// First route whose pattern matches `path`; otherwise the `/` route.
    /// Returns `None` only when no `/` route is registered.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let parts = segments(path);
        self.routes
            .iter()
            .find_map(|route| match_route(route, &parts))
            .or_else(|| {
                self.routes.iter().find(|r| r.pattern == "/").map(|r| RouteMatch {
                    page: r.page,
                    params: HashMap::new(),
                })
            })
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_route(route: &RouteDef, parts: &[&str]) -> Option<RouteMatch> {
    let pattern = segments(route.pattern);
    if pattern.len() != parts.len() {
        return None;
    }
    let mut params = HashMap::new();
    for (expected, actual) in pattern.iter().zip(parts) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_string(), decode_segment(actual));
        } else if expected != actual {
            return None;
        }
    }
    Some(RouteMatch {
        page: route.page,
        params,
    })
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

pub fn category_href(slug: &str) -> String {
    format!("#/categoria/{}", encode_component(slug))
}

pub fn bread_href(slug: &str) -> String {
    format!("#/pan/{}", encode_component(slug))
}

pub fn anchor_href(bread_slug: &str, anchor: &str) -> String {
    format!("{}#{anchor}", bread_href(bread_slug))
}

/// Whether a header link should be highlighted for the current hash.
pub fn nav_active(hash: &str, href: &str) -> bool {
    let hash = if hash.is_empty() { "#/" } else { hash };
    if href == "#/" {
        return parse_hash(hash).path == "/";
    }
    hash.starts_with(href)
}

/// Issues navigation tokens; only the newest one may write to the page.
#[derive(Debug, Default)]
pub struct Navigator {
    generation: AtomicU64,
    shown: Mutex<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavToken(u64);

/// What a hash change asks the shell to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The path is already on screen; only move to the anchor.
    Scroll(String),
    /// Render the location, writing only while the token is current.
    Render(NavToken),
}

impl Navigator {
    fn begin(&self) -> NavToken {
        NavToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: NavToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// A table-of-contents click on the page being shown only scrolls;
    /// anything else starts a new navigation.
    pub fn navigate(&self, location: &HashLocation) -> Step {
        let mut shown = self.shown_path();
        if let Some(anchor) = &location.anchor {
            if *shown == location.path {
                return Step::Scroll(anchor.clone());
            }
        }
        shown.clone_from(&location.path);
        drop(shown);
        Step::Render(self.begin())
    }

    /// Search results replace whatever route was shown.
    pub fn begin_search(&self) -> NavToken {
        self.shown_path().clear();
        self.begin()
    }

    fn shown_path(&self) -> MutexGuard<'_, String> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
