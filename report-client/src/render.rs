//! Markdown to HTML for model output.
//!
//! Model text is untrusted. Sanitization works on the parser's event stream:
//! raw HTML is turned back into text (and therefore escaped) and link or
//! image targets with script-capable schemes are replaced with `#`.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

pub const DISCLAIMER: &str = "This simplified summary is AI-generated and should not replace professional medical advice. Always consult with healthcare professionals for medical decisions.";

/// Shown when the relay answered without a caption.
pub const NO_ANALYSIS: &str = "No analysis generated";

/// Sanitized analysis ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAnalysis {
    pub html: String,
    pub disclaimer: &'static str,
}

/// Render a relay caption, falling back to [`NO_ANALYSIS`] when absent or empty.
pub fn render_analysis(caption: Option<&str>) -> RenderedAnalysis {
    let markdown = caption.filter(|c| !c.is_empty()).unwrap_or(NO_ANALYSIS);
    RenderedAnalysis {
        html: render_markdown(markdown),
        disclaimer: DISCLAIMER,
    }
}

/// Convert markdown to HTML with executable content removed.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(sanitize_event);

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url, false),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url, true),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>, is_image: bool) -> CowStr<'_> {
    // Browsers ignore ASCII whitespace and control characters inside schemes.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let blocked = normalized.starts_with("javascript:")
        || normalized.starts_with("vbscript:")
        || (normalized.starts_with("data:")
            && !(is_image && normalized.starts_with("data:image/")));

    if blocked {
        CowStr::Borrowed("#")
    } else {
        url
    }
}
