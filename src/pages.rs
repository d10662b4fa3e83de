use crate::catalog::Tip;
use crate::markdown::RenderedRecipe;
use crate::router::anchor_href;
use crate::views::{cover_style, BreadCard, BreadDetail, CategoryCard, CategoryDetail, HomeModel, SearchOutcome};
use leptos::prelude::*;

/// Body of the bread detail page while its Markdown is in flight.
#[derive(Clone, Debug, PartialEq)]
pub enum RecipeState {
    Loading,
    Ready(RenderedRecipe),
    Failed(String),
}

#[component]
pub fn Notice(children: Children) -> impl IntoView {
    view! { <div class="notice">{children()}</div> }
}

#[component]
pub fn Section(title: &'static str, children: Children) -> impl IntoView {
    view! {
        <section class="section">
            <h3>{title}</h3>
            {children()}
        </section>
    }
}

#[component]
pub fn CategoryTile(card: CategoryCard) -> impl IntoView {
    view! {
        <article class="card">
            <div class="card-media"></div>
            <div class="card-body">
                <span class="badge">{format!("{} panes", card.count)}</span>
                <h4 class="card-title"><a href=card.href>{card.name}</a></h4>
                <p class="card-meta">{card.description}</p>
            </div>
        </article>
    }
}

#[component]
pub fn BreadTile(card: BreadCard) -> impl IntoView {
    let cover = card.cover.as_deref().map(cover_style);
    view! {
        <article class="card">
            <div class="card-media" role="img" aria-label=card.name.clone() style=cover></div>
            <div class="card-body">
                <span class="badge">{card.category}</span>
                <h4 class="card-title"><a href=card.href>{card.name}</a></h4>
                <p class="card-meta">{card.summary}</p>
            </div>
        </article>
    }
}

fn category_grid(cards: Vec<CategoryCard>) -> AnyView {
    view! {
        <div class="grid">
            {cards.into_iter().map(|card| view! { <CategoryTile card=card /> }).collect::<Vec<_>>()}
        </div>
    }
    .into_any()
}

fn bread_grid(cards: Vec<BreadCard>) -> AnyView {
    view! {
        <div class="grid">
            {cards.into_iter().map(|card| view! { <BreadTile card=card /> }).collect::<Vec<_>>()}
        </div>
    }
    .into_any()
}

#[component]
pub fn HomePage(model: HomeModel) -> impl IntoView {
    let HomeModel { featured, latest } = model;
    view! {
        <section class="hero">
            <div class="card">
                <div class="kicker">"Hornear en casa"</div>
                <h1 class="display">"Recetas y consejos de panadería casera"</h1>
                <p class="subtitle">
                    "Explora panes por categoría, aprende técnicas y disfruta el proceso uno a la vez."
                </p>
                <div style="display:flex; gap:.6rem; margin-top:.8rem">
                    <a class="btn btn-primary" href="#/categorias">"Ver todas las categorías"</a>
                    <a class="btn btn-outline" href="#/consejos">"Consejos"</a>
                </div>
            </div>
            <div class="card">
                <Notice>
                    "Las recetas se cargan desde " <code>"content/recipes/*.md"</code>
                    " e indexadas por " <code>"data/breads.json"</code> "."
                </Notice>
            </div>
        </section>
        <Section title="Categorías destacadas">{category_grid(featured)}</Section>
        <Section title="Últimos panes añadidos">{bread_grid(latest)}</Section>
    }
}

#[component]
pub fn CategoriesPage(cards: Vec<CategoryCard>) -> impl IntoView {
    view! {
        <h2>"Categorías"</h2>
        <p class="subtitle">"Explora panes agrupados por estilo, técnica o tradición."</p>
        {category_grid(cards)}
    }
}

#[component]
pub fn CategoryPage(detail: CategoryDetail) -> impl IntoView {
    view! {
        <h2>{detail.name}</h2>
        <p class="subtitle">{detail.description}</p>
        {bread_grid(detail.breads)}
    }
}

#[component]
pub fn BreadPage(detail: BreadDetail, recipe: ReadSignal<RecipeState>) -> impl IntoView {
    let BreadDetail {
        slug,
        name,
        category,
        category_href,
        summary,
        tags,
        source,
        md: _,
    } = detail;

    let tags = (!tags.is_empty()).then(|| {
        view! {
            <p>
                {tags
                    .into_iter()
                    .map(|tag| view! { <span class="badge" style="margin-right:.3rem">{tag}</span> })
                    .collect::<Vec<_>>()}
            </p>
        }
    });

    let toc = move || {
        let entries = recipe.with(|state| match state {
            RecipeState::Ready(rendered) => rendered.toc.clone(),
            _ => Vec::new(),
        });
        let class = if entries.is_empty() { "toc-wrap hidden" } else { "toc-wrap" };
        view! {
            <div class=class id="tocWrap">
                <div class="toc-title">"Contenido"</div>
                <nav class="toc" id="toc">
                    {entries
                        .into_iter()
                        .map(|entry| {
                            view! {
                                <a
                                    class=format!("toc-link level-{}", entry.level)
                                    href=anchor_href(&slug, &entry.anchor)
                                >
                                    {entry.text}
                                </a>
                            }
                        })
                        .collect::<Vec<_>>()}
                </nav>
            </div>
        }
    };

    let body = move || match recipe.get() {
        RecipeState::Loading => view! { <p class="tiny">"Cargando receta…"</p> }.into_any(),
        RecipeState::Ready(rendered) => view! { <div inner_html=rendered.html></div> }.into_any(),
        RecipeState::Failed(path) => {
            view! { <p class="tiny">"Error al cargar la receta: " {path}</p> }.into_any()
        }
    };

    view! {
        <article class="card">
            <div class="card-body">
                <a href=category_href class="badge">{category}</a>
                <h2 style="margin:.4rem 0">{name}</h2>
                {summary.map(|text| view! { <p class="subtitle">{text}</p> })}
                {tags}
                {toc}
                <div id="md" class="markdown-body">{body}</div>
                {source.map(|text| view! { <p class="tiny">"Fuente: " {text}</p> })}
            </div>
        </article>
    }
}

#[component]
pub fn TipsPage(tips: Vec<Tip>) -> impl IntoView {
    view! {
        <h2>"Consejos de panadería casera"</h2>
        <table class="table">
            <thead>
                <tr><th>"Tema"</th><th>"Consejo"</th></tr>
            </thead>
            <tbody>
                {tips
                    .into_iter()
                    .map(|row| view! { <tr><td>{row.topic}</td><td>{row.tip}</td></tr> })
                    .collect::<Vec<_>>()}
            </tbody>
        </table>
    }
}

#[component]
pub fn AboutPage() -> impl IntoView {
    view! {
        <h2>"Acerca"</h2>
        <p>
            "Frontend estático que indexa recetas Markdown a través de un JSON central. "
            "Ideal para GitHub Pages."
        </p>
    }
}

#[component]
pub fn SearchPage(outcome: SearchOutcome) -> impl IntoView {
    let SearchOutcome { query, results } = outcome;
    view! {
        <h2>{format!("Resultados para “{query}”")}</h2>
        {if results.is_empty() {
            view! { <p>"No se encontraron panes."</p> }.into_any()
        } else {
            bread_grid(results)
        }}
    }
}

#[component]
pub fn LoadError(reason: String) -> impl IntoView {
    view! {
        <Notice>
            <strong>"No pudimos cargar el catálogo."</strong>
            <p class="tiny">{reason}</p>
            <button class="btn btn-outline" on:click=move |_| {
                let _ = window().location().reload();
            }>"Reintentar"</button>
        </Notice>
    }
}
