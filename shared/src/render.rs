//! Reader-facing rendering of article bodies.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Render an article body to sanitized HTML.
///
/// Bodies saved by the rich-text editor are already HTML and are only
/// sanitized; everything else is treated as Markdown. Relative image paths
/// are resolved against `asset_base` when one is given.
pub fn render_body_html(body: &str, asset_base: Option<&str>) -> String {
    if body.trim().is_empty() {
        return String::new();
    }

    let raw = if looks_like_html(body) {
        body.to_string()
    } else {
        markdown_to_html(body, asset_base)
    };
    ammonia::clean(&raw)
}

/// Convert Markdown into HTML with common extensions enabled.
pub fn markdown_to_html(content: &str, asset_base: Option<&str>) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);

    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: resolve_asset(dest_url, asset_base),
            title,
            id,
        }),
        _ => event,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

fn resolve_asset<'a>(dest_url: CowStr<'a>, asset_base: Option<&str>) -> CowStr<'a> {
    let Some(base) = asset_base else {
        return dest_url;
    };
    if dest_url.contains("://") || dest_url.starts_with("data:") || dest_url.starts_with("//") {
        return dest_url;
    }
    let path = dest_url.trim_start_matches("./").trim_start_matches('/');
    CowStr::from(format!("{}/{}", base.trim_end_matches('/'), path))
}

fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with('<') && trimmed.contains("</")
}
