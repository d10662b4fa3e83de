use leptos::task::spawn_local;

use crate::catalog::{CatalogStore, Tip};
use crate::config::SiteConfig;
use crate::http::{fetch_text, HttpCatalog};
use crate::markdown::{first_image, render_recipe};
use crate::pages::*;
use crate::router::{
    nav_active, parse_hash, HashLocation, NavToken, Navigator, Page, RouteMatch, Router, Step,
};
use crate::views::{self, BreadDetail, CategoryCard, CategoryDetail, HomeModel, SearchOutcome};
use leptos::prelude::*;
use leptos::web_sys::{ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition};
use log::{debug, error};
use std::collections::HashMap;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

const CATEGORY_MISSING: &str = "No encontramos la categoría.";
const BREAD_MISSING: &str = "No encontramos este pan.";

/// What the content region currently shows.
#[derive(Clone, Debug, PartialEq)]
enum Screen {
    Loading,
    Home(HomeModel),
    Categories(Vec<CategoryCard>),
    Category(CategoryDetail),
    Bread(BreadDetail),
    Tips(Vec<Tip>),
    About,
    Search(SearchOutcome),
    NotFound(&'static str),
    Failed(String),
}

/// Everything a navigation needs, cheap to clone into event handlers and tasks.
#[derive(Clone)]
struct Shell {
    config: Arc<SiteConfig>,
    store: Arc<CatalogStore<HttpCatalog>>,
    router: Arc<Router>,
    navigator: Arc<Navigator>,
    set_screen: WriteSignal<Screen>,
    set_recipe: WriteSignal<RecipeState>,
    set_current_hash: WriteSignal<String>,
}

impl Shell {
    fn dispatch(&self) {
        let hash = window().location().hash().unwrap_or_default();
        self.set_current_hash.set(hash.clone());
        let location = parse_hash(&hash);

        let token = match self.navigator.navigate(&location) {
            Step::Scroll(anchor) => {
                scroll_to_anchor(&anchor);
                return;
            }
            Step::Render(token) => token,
        };
        let Some(matched) = self.router.resolve(&location.path) else {
            return;
        };
        debug!("route {} -> {:?}", location.path, matched.page);
        let shell = self.clone();
        spawn_local(async move { shell.render(token, matched, location).await });
    }

    fn search(&self, query: String) {
        let token = self.navigator.begin_search();
        let shell = self.clone();
        spawn_local(async move {
            match shell.store.load().await {
                Ok(catalog) => {
                    shell.show(token, Screen::Search(views::search_results(&catalog, &query)));
                }
                Err(err) => {
                    error!("catalog load failed: {err}");
                    shell.show(token, Screen::Failed(err.to_string()));
                }
            }
        });
    }

    /// Writes `screen` unless a newer navigation started meanwhile.
    fn show(&self, token: NavToken, screen: Screen) -> bool {
        if !self.navigator.is_current(token) {
            debug!("dropping superseded render");
            return false;
        }
        self.set_screen.set(screen);
        true
    }

    async fn render(&self, token: NavToken, matched: RouteMatch, location: HashLocation) {
        if matched.page == Page::About {
            self.show(token, Screen::About);
            return;
        }
        self.show(token, Screen::Loading);

        let catalog = match self.store.load().await {
            Ok(catalog) => catalog,
            Err(err) => {
                error!("catalog load failed: {err}");
                self.show(token, Screen::Failed(err.to_string()));
                return;
            }
        };

        let slug = matched.param("slug");
        match matched.page {
            Page::Home => {
                let model = views::home(&catalog, &self.config);
                if self.show(token, Screen::Home(model.clone())) {
                    self.hydrate_covers(token, model).await;
                }
            }
            Page::Categories => {
                self.show(token, Screen::Categories(views::categories(&catalog)));
            }
            Page::Category => {
                let screen = views::category_detail(&catalog, slug)
                    .map_or(Screen::NotFound(CATEGORY_MISSING), Screen::Category);
                self.show(token, screen);
            }
            Page::Bread => match views::bread_detail(&catalog, slug) {
                Some(detail) => self.show_bread(token, detail, location.anchor).await,
                None => {
                    self.show(token, Screen::NotFound(BREAD_MISSING));
                }
            },
            Page::Tips => {
                self.show(token, Screen::Tips(views::tips(&catalog)));
            }
            Page::About => {
                self.show(token, Screen::About);
            }
        }
    }

    async fn show_bread(&self, token: NavToken, detail: BreadDetail, anchor: Option<String>) {
        if !self.navigator.is_current(token) {
            return;
        }
        let md = detail.md.clone();
        self.set_recipe.set(RecipeState::Loading);
        self.set_screen.set(Screen::Bread(detail));

        let state = match fetch_text(&md).await {
            Ok(raw) => RecipeState::Ready(render_recipe(&raw)),
            Err(err) => {
                error!("recipe {md} failed to load: {err}");
                RecipeState::Failed(md)
            }
        };
        if !self.navigator.is_current(token) {
            debug!("dropping superseded recipe");
            return;
        }
        let ready = matches!(state, RecipeState::Ready(_));
        self.set_recipe.set(state);
        if let (true, Some(anchor)) = (ready, anchor) {
            request_animation_frame(move || scroll_to_anchor(&anchor));
        }
    }

    /// Fills card covers from each recipe's first image, then re-renders home.
    async fn hydrate_covers(&self, token: NavToken, mut model: HomeModel) {
        let wanted = views::missing_covers(&model.latest, self.config.cover_fetch_limit);
        let mut covers = HashMap::new();
        for (slug, md) in wanted {
            if !self.navigator.is_current(token) {
                return;
            }
            match fetch_text(&md).await {
                Ok(raw) => {
                    if let Some(url) = first_image(&raw) {
                        covers.insert(slug, url);
                    }
                }
                Err(err) => debug!("no cover for {slug}: {err}"),
            }
        }
        if covers.is_empty() {
            return;
        }
        debug!("hydrated {} covers", covers.len());
        views::apply_covers(&mut model.latest, &covers);
        self.show(token, Screen::Home(model));
    }
}

fn scroll_to_anchor(anchor: &str) {
    let Some(target) = document().get_element_by_id(anchor) else {
        return;
    };
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Start);
    target.scroll_into_view_with_scroll_into_view_options(&options);
}

#[component]
pub fn App(config: SiteConfig) -> impl IntoView {
    let (screen, set_screen) = signal(Screen::Loading);
    let (recipe, set_recipe) = signal(RecipeState::Loading);
    let (current_hash, set_current_hash) = signal(String::new());
    let (query, set_query) = signal(String::new());

    let shell = Shell {
        store: Arc::new(CatalogStore::new(HttpCatalog::new(config.catalog_path.clone()))),
        config: Arc::new(config),
        router: Arc::new(Router::site()),
        navigator: Arc::new(Navigator::default()),
        set_screen,
        set_recipe,
        set_current_hash,
    };

    let closure = {
        let shell = shell.clone();
        Closure::<dyn FnMut(leptos::web_sys::Event)>::new(move |_: leptos::web_sys::Event| {
            shell.dispatch();
        })
    };
    let _ = window().add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
    closure.forget();

    {
        let shell = shell.clone();
        Effect::new(move |_| shell.dispatch());
    }

    let on_search = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let q = query.get_untracked().trim().to_string();
        if q.is_empty() {
            return;
        }
        shell.search(q);
        set_query.set(String::new());
    };

    let nav_class = move |href: &'static str| {
        move || if nav_active(&current_hash.get(), href) { "active" } else { "" }
    };

    let content = move || match screen.get() {
        Screen::Loading => view! { <p class="tiny">"Cargando…"</p> }.into_any(),
        Screen::Home(model) => view! { <HomePage model=model /> }.into_any(),
        Screen::Categories(cards) => view! { <CategoriesPage cards=cards /> }.into_any(),
        Screen::Category(detail) => view! { <CategoryPage detail=detail /> }.into_any(),
        Screen::Bread(detail) => view! { <BreadPage detail=detail recipe=recipe /> }.into_any(),
        Screen::Tips(tips) => view! { <TipsPage tips=tips /> }.into_any(),
        Screen::About => view! { <AboutPage /> }.into_any(),
        Screen::Search(outcome) => view! { <SearchPage outcome=outcome /> }.into_any(),
        Screen::NotFound(message) => view! { <p>{message}</p> }.into_any(),
        Screen::Failed(reason) => view! { <LoadError reason=reason /> }.into_any(),
    };

    let year = js_sys::Date::new_0().get_full_year();

    view! {
        <header class="site-header">
            <div class="container header-inner">
                <a class="brand" href="#/">"Panadería casera"</a>
                <nav class="nav">
                    <a href="#/" class=nav_class("#/")>"Inicio"</a>
                    <a href="#/categorias" class=nav_class("#/categorias")>"Categorías"</a>
                    <a href="#/consejos" class=nav_class("#/consejos")>"Consejos"</a>
                    <a href="#/acerca" class=nav_class("#/acerca")>"Acerca"</a>
                </nav>
                <form id="searchForm" class="search" role="search" on:submit=on_search>
                    <input
                        id="searchInput"
                        type="search"
                        placeholder="Buscar panes…"
                        aria-label="Buscar panes"
                        prop:value=move || query.get()
                        on:input=move |ev| set_query.set(event_target_value(&ev))
                    />
                    <button class="btn btn-primary" type="submit">"Buscar"</button>
                </form>
            </div>
        </header>
        <main id="app" class="container">{content}</main>
        <footer class="site-footer">
            <div class="container tiny">{format!("© {year} Panadería casera")}</div>
        </footer>
    }
}
