//! HTML and terminal rendering of the list and article views.
use chrono::{DateTime, Locale, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::model::{Article, ListEntry};
use crate::reading_time::ReadingTime;

pub const LOAD_MORE_LABEL: &str = "Carregar mais posts";

/// Unreserved characters of RFC 3986 stay as they are in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// `15 mar 2021`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format_localized("%d %b %Y", Locale::pt_BR).to_string()
}

pub fn display_date(date: Option<&DateTime<Utc>>) -> String {
    date.map(format_date).unwrap_or_default()
}

/// File stem for a post page. Path separators and control characters
/// cannot appear in a single file name, so they become `_`.
pub fn post_file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match stem.as_str() {
        "" | "." | ".." => format!("_{}", stem),
        _ => stem,
    }
}

/// Where a post page lives on disk, relative to the export root.
pub fn post_path(id: &str) -> String {
    format!("post/{}.html", post_file_stem(id))
}

/// Link to [`post_path`] from a list page.
pub fn post_href(id: &str) -> String {
    format!(
        "post/{}.html",
        utf8_percent_encode(&post_file_stem(id), SEGMENT)
    )
}

/// Terminal line for one list entry.
pub fn entry_line(entry: &ListEntry) -> String {
    format!(
        "{}\n  {}\n  {} | {}",
        entry.title,
        entry.subtitle,
        display_date(entry.published_at.as_ref()),
        entry.author
    )
}

pub fn article_text(article: &Article, reading: ReadingTime) -> String {
    let mut out = format!(
        "{}\n{} | {} | {} min\n",
        article.title,
        display_date(article.published_at.as_ref()),
        article.author,
        reading.minutes
    );
    for block in &article.content {
        out.push('\n');
        if let Some(heading) = &block.heading {
            out.push_str(&format!("## {}\n", heading));
        }
        for p in &block.paragraphs {
            out.push_str(&p.text);
            out.push('\n');
        }
    }
    out
}

pub fn render_list(entries: &[ListEntry], next_href: Option<&str>) -> String {
    let mut body = String::new();
    for e in entries {
        body.push_str(&format!(
            "<a class=\"post\" href=\"{}\"><strong>{}</strong><p>{}</p><div class=\"info\"><time>{}</time> <span>{}</span></div></a>\n",
            html_attr(&post_href(&e.id)),
            html_escape(&e.title),
            html_escape(&e.subtitle),
            html_escape(&display_date(e.published_at.as_ref())),
            html_escape(&e.author)
        ));
    }
    // No trigger once the store reports no further pages.
    let more = match next_href {
        Some(href) => format!(
            "<a class=\"more\" href=\"{}\">{}</a>",
            html_attr(href),
            LOAD_MORE_LABEL
        ),
        None => String::new(),
    };
    page("Home", &format!("<div class=\"posts\">\n{}</div>\n{}", body, more))
}

pub fn render_article(article: &Article, reading: ReadingTime) -> String {
    let mut body = String::new();
    if let Some(url) = &article.banner_url {
        body.push_str(&format!(
            "<div class=\"banner\"><img src=\"{}\" alt=\"banner\" /></div>\n",
            html_attr(url)
        ));
    }
    body.push_str(&format!(
        "<article><h1>{}</h1><div class=\"info\"><time>{}</time> <span>{}</span> <span>{} min</span></div>\n",
        html_escape(&article.title),
        html_escape(&display_date(article.published_at.as_ref())),
        html_escape(&article.author),
        reading.minutes
    ));
    for block in &article.content {
        if let Some(heading) = &block.heading {
            body.push_str(&format!("<h2>{}</h2>\n", html_escape(heading)));
        }
        for p in &block.paragraphs {
            body.push_str(&format!("<p>{}</p>\n", html_escape(&p.text)));
        }
    }
    body.push_str("</article>");
    page(&format!("{} | Spacetraveling", article.title), &body)
}

fn page(title: &str, main: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="pt-BR">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{}</title>
  </head>
  <body>
    <main>
{}
    </main>
  </body>
</html>
"#,
        html_escape(title),
        main
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn html_attr(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}
