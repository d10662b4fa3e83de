//! Recipe Markdown to HTML: video embeds, heading anchors with a table of
//! contents, captioned images and external links opening in a new tab.

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape::escape_href;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub anchor: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedRecipe {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

pub fn render_recipe(raw: &str) -> RenderedRecipe {
    let source = rewrite_video_lines(raw);
    let mut events: Vec<Event> = Parser::new_ext(&source, parser_options()).collect();
    let toc = anchor_headings(&mut events);

    let mut html = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, decorate(events).into_iter());
    RenderedRecipe { html, toc }
}

/// Replaces lines holding nothing but a video URL with a player.
pub fn rewrite_video_lines(raw: &str) -> String {
    raw.lines()
        .map(|line| match video_embed(line) {
            // Blank lines around the embed keep it out of neighbouring paragraphs.
            Some(html) => format!("\n{html}\n"),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn video_embed(line: &str) -> Option<String> {
    static RE_YT_WATCH: OnceLock<Regex> = OnceLock::new();
    static RE_YT_SHORT: OnceLock<Regex> = OnceLock::new();
    static RE_VIMEO: OnceLock<Regex> = OnceLock::new();
    static RE_FILE: OnceLock<Regex> = OnceLock::new();

    let re_yt_watch = RE_YT_WATCH.get_or_init(|| {
        Regex::new(r"(?i)^\s*https?://(?:www\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]+)\S*\s*$")
            .unwrap()
    });
    let re_yt_short = RE_YT_SHORT.get_or_init(|| {
        Regex::new(r"(?i)^\s*https?://youtu\.be/([A-Za-z0-9_-]+)\S*\s*$").unwrap()
    });
    let re_vimeo = RE_VIMEO
        .get_or_init(|| Regex::new(r"(?i)^\s*https?://(?:www\.)?vimeo\.com/(\d+)\S*\s*$").unwrap());
    let re_file = RE_FILE
        .get_or_init(|| Regex::new(r"(?i)^\s*(https?://\S+?\.(?:mp4|webm))\s*$").unwrap());

    let iframe = |src: String| {
        format!(
            "<div class=\"md-video\"><iframe src=\"{src}\" allowfullscreen loading=\"lazy\"></iframe></div>"
        )
    };

    if let Some(cap) = re_yt_watch.captures(line).or_else(|| re_yt_short.captures(line)) {
        return Some(iframe(format!("https://www.youtube.com/embed/{}", &cap[1])));
    }
    if let Some(cap) = re_vimeo.captures(line) {
        return Some(iframe(format!("https://player.vimeo.com/video/{}", &cap[1])));
    }
    re_file.captures(line).map(|cap| {
        format!(
            "<video class=\"md-video-file\" controls preload=\"metadata\"><source src=\"{}\"></video>",
            escape_html(&cap[1])
        )
    })
}

/// Gives every heading an `id` and returns the level 1-3 headings in order.
fn anchor_headings(events: &mut [Event<'_>]) -> Vec<TocEntry> {
    let mut slugger = Slugger::default();
    let mut toc = Vec::new();
    let mut open: Option<(usize, String)> = None;

    for idx in 0..events.len() {
        if let Event::End(TagEnd::Heading(level)) = events[idx] {
            let Some((start, text)) = open.take() else {
                continue;
            };
            let anchor = slugger.slug(&text);
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
                *id = Some(CowStr::from(anchor.clone()));
            }
            if (level as u8) <= 3 {
                toc.push(TocEntry {
                    level: level as u8,
                    text: text.trim().to_string(),
                    anchor,
                });
            }
            continue;
        }
        match &events[idx] {
            Event::Start(Tag::Heading { .. }) => open = Some((idx, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push_str(text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some((_, buf)) = open.as_mut() {
                    buf.push(' ');
                }
            }
            _ => {}
        }
    }
    toc
}

struct PendingImage<'a> {
    src: CowStr<'a>,
    title: CowStr<'a>,
    alt: String,
}

impl PendingImage<'_> {
    fn into_html(self) -> String {
        let alt = escape_html(&self.alt);
        let title = if self.title.is_empty() {
            String::new()
        } else {
            format!(" title=\"{}\"", escape_html(&self.title))
        };
        let caption = if alt.is_empty() {
            String::new()
        } else {
            format!("<figcaption>{alt}</figcaption>")
        };
        format!(
            "<figure class=\"md-figure\"><img src=\"{}\" alt=\"{alt}\"{title}/>{caption}</figure>",
            escape_html(&self.src)
        )
    }
}

fn is_external(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Wraps images in figures and retargets external links.
fn decorate(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut image: Option<PendingImage> = None;
    let mut in_external_link = false;

    for event in events {
        if image.is_some() {
            match event {
                Event::End(TagEnd::Image) => {
                    if let Some(done) = image.take() {
                        out.push(Event::InlineHtml(done.into_html().into()));
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(pending) = image.as_mut() {
                        pending.alt.push_str(&text);
                    }
                }
                _ => {}
            }
            continue;
        }

        match event {
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                image = Some(PendingImage {
                    src: dest_url,
                    title,
                    alt: String::new(),
                });
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if is_external(&dest_url) => {
                let title = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", escape_html(&title))
                };
                let mut href = String::with_capacity(dest_url.len());
                // Writing into a String cannot fail.
                let _ = escape_href(&mut href, &dest_url);
                out.push(Event::InlineHtml(
                    format!("<a href=\"{href}\"{title} target=\"_blank\" rel=\"noopener noreferrer\">")
                        .into(),
                ));
                in_external_link = true;
            }
            Event::End(TagEnd::Link) if in_external_link => {
                out.push(Event::InlineHtml("</a>".into()));
                in_external_link = false;
            }
            other => out.push(other),
        }
    }
    out
}

/// URL of the first image in a document, if any.
pub fn first_image(raw: &str) -> Option<String> {
    Parser::new_ext(raw, parser_options()).find_map(|event| match event {
        Event::Start(Tag::Image { dest_url, .. }) if !dest_url.is_empty() => {
            Some(dest_url.into_string())
        }
        _ => None,
    })
}

/// Heading anchors: lowercase, punctuation dropped, whitespace to `-`,
/// repeats numbered `-1`, `-2`, ...
#[derive(Default)]
struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut candidate = base.clone();
        if let Some(&count) = self.seen.get(&base) {
            let mut n = count;
            loop {
                n += 1;
                candidate = format!("{base}-{n}");
                if !self.seen.contains_key(&candidate) {
                    break;
                }
            }
            self.seen.insert(base, n);
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

fn slugify(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .chars()
        .filter(|c| !is_slug_punctuation(*c))
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect()
}

fn is_slug_punctuation(c: char) -> bool {
    matches!(c, '\u{2000}'..='\u{206f}' | '\u{2e00}'..='\u{2e7f}')
        || (c.is_ascii_punctuation() && c != '-' && c != '_')
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_youtube_line_becomes_embed() {
        let out = rewrite_video_lines("https://youtu.be/abc123");
        assert!(out.contains("<iframe src=\"https://www.youtube.com/embed/abc123\""));
        assert!(!out.contains("youtu.be"));
    }

    #[test]
    fn url_inside_sentence_is_untouched() {
        let line = "see https://youtu.be/abc123 here";
        assert_eq!(rewrite_video_lines(line), line);
    }

    #[test]
    fn recognizes_each_video_kind() {
        let out = rewrite_video_lines(
            "  https://www.youtube.com/watch?v=XyZ_9-a&t=30  \nHTTPS://vimeo.com/12345\nhttps://cdn.example.com/clip.webm",
        );
        assert!(out.contains("https://www.youtube.com/embed/XyZ_9-a\""));
        assert!(out.contains("https://player.vimeo.com/video/12345"));
        assert!(out.contains(
            "<video class=\"md-video-file\" controls preload=\"metadata\"><source src=\"https://cdn.example.com/clip.webm\"></video>"
        ));
    }

    #[test]
    fn embed_survives_markdown_rendering() {
        let recipe = render_recipe("Mira el amasado:\nhttps://youtu.be/abc123\nY sigue.");
        assert!(recipe
            .html
            .contains("<div class=\"md-video\"><iframe src=\"https://www.youtube.com/embed/abc123\""));
        assert!(recipe.html.contains("<p>Mira el amasado:</p>"));
    }

    #[test]
    fn headings_get_anchors_and_toc() {
        let recipe = render_recipe(
            "# Ingredientes\n\n## Masa `base`\n\n#### Nota\n\n### Horneado: 45 minutos!\n",
        );
        assert!(recipe.html.contains("<h1 id=\"ingredientes\">Ingredientes</h1>"));
        assert!(recipe.html.contains("<h4 id=\"nota\">Nota</h4>"));
        let anchors: Vec<_> = recipe.toc.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["ingredientes", "masa-base", "horneado-45-minutos"]);
        let levels: Vec<_> = recipe.toc.iter().map(|e| e.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(recipe.toc[1].text, "Masa base");
    }

    #[test]
    fn repeated_headings_are_numbered() {
        let recipe = render_recipe("## Paso\n\n## Paso\n\n## Paso\n");
        let anchors: Vec<_> = recipe.toc.iter().map(|e| e.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["paso", "paso-1", "paso-2"]);
    }

    #[test]
    fn line_breaks_in_headings_separate_words() {
        let recipe = render_recipe("Paso\nuno\n---\n");
        assert!(recipe.html.contains("<h2 id=\"paso-uno\">"));
        assert_eq!(
            recipe.toc,
            vec![TocEntry {
                level: 2,
                text: "Paso uno".to_string(),
                anchor: "paso-uno".to_string(),
            }]
        );
    }

    #[test]
    fn no_headings_means_empty_toc() {
        assert!(render_recipe("Solo texto.").toc.is_empty());
    }

    #[test]
    fn images_become_captioned_figures() {
        let recipe = render_recipe("![Miga abierta](img/miga.jpg \"Miga\")");
        assert!(recipe.html.contains(
            "<figure class=\"md-figure\"><img src=\"img/miga.jpg\" alt=\"Miga abierta\" title=\"Miga\"/><figcaption>Miga abierta</figcaption></figure>"
        ));
    }

    #[test]
    fn only_external_links_open_new_tab() {
        let recipe = render_recipe("[King Arthur](https://kingarthur.com) y [hogaza](#/pan/hogaza)");
        assert!(recipe.html.contains(
            "<a href=\"https://kingarthur.com\" target=\"_blank\" rel=\"noopener noreferrer\">King Arthur</a>"
        ));
        assert!(recipe.html.contains("<a href=\"#/pan/hogaza\">hogaza</a>"));
    }

    #[test]
    fn external_hrefs_are_percent_encoded() {
        let recipe = render_recipe("[x](<https://a.com/b c>)");
        assert!(recipe.html.contains("<a href=\"https://a.com/b%20c\" target=\"_blank\""));
    }

    #[test]
    fn finds_first_image() {
        let md = "# Conchas\n\nTexto\n\n![cubierta](img/conchas.jpg)\n\n![otra](img/2.jpg)";
        assert_eq!(first_image(md).as_deref(), Some("img/conchas.jpg"));
        assert_eq!(first_image("sin imágenes"), None);
    }
}
