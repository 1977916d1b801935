use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::handlers::{Notice, SessionController, UploadPhase};
use crate::models::RecipeOutcome;

const TEMPLATE: &str = include_str!("../../static/index.html");

/// Render the whole page for one session. `notice` is the one-shot message taken from it.
pub fn render(session: &SessionController, notice: Option<&Notice>) -> String {
    let notice_html = notice.map(render_notice).unwrap_or_default();

    let image_html = session
        .image()
        .map(|image| {
            format!(
                r#"<img class="preview" src="/image?name={}" alt="Your ingredient photo"><div class="hint">{}</div>"#,
                escape_html(&image.file_name),
                escape_html(&image.file_name)
            )
        })
        .unwrap_or_default()
        + &render_phase(session.phase());

    let result_html = session.recipe().map(render_result).unwrap_or_default();

    fill(
        TEMPLATE,
        &[
            ("notice", notice_html),
            ("image", image_html),
            ("ingredients", escape_html(session.ingredients_text())),
            ("preference", escape_html(session.preference_text())),
            ("result", result_html),
        ],
    )
}

fn render_phase(phase: UploadPhase) -> String {
    let status = match phase {
        UploadPhase::Idle => return String::new(),
        UploadPhase::ImageReceived | UploadPhase::Recognizing => "🔄 Recognising ingredients...",
        UploadPhase::Populated => "✅ Ingredients recognised from this photo",
        UploadPhase::NothingFound => "⚠️ No ingredients recognised in this photo",
        UploadPhase::Failed => "❌ Recognition failed for this photo",
    };
    format!(r#"<div class="hint phase">{}</div>"#, status)
}

fn render_notice(notice: &Notice) -> String {
    let (class, text) = match notice {
        Notice::Success(text) => ("success", text),
        Notice::Warning(text) => ("warning", text),
        Notice::Error(text) => ("error", text),
    };
    format!(r#"<div class="notice {}">{}</div>"#, class, escape_html(text))
}

fn render_result(outcome: &RecipeOutcome) -> String {
    let body = match outcome {
        RecipeOutcome::Recipe(markdown) => markdown_to_html(markdown),
        RecipeOutcome::EmptyInput => render_notice(&Notice::Warning(outcome.to_string())),
        RecipeOutcome::Failed(_) => render_notice(&Notice::Error(outcome.to_string())),
    };
    format!(
        r#"<section class="result"><h2>✅ Your customized recipe</h2>{}</section>"#,
        body
    )
}

/// Model output is untrusted: raw HTML in it is shown as text and
/// link/image targets outside http, https and mailto become `#`.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
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
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

// Relative targets have no scheme and are kept. Browsers ignore tabs and
// newlines inside a scheme, so those are stripped before comparing.
fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let compact: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();

    let scheme = match compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#')) {
        Some(pos) if compact[pos..].starts_with(':') => compact[..pos].to_ascii_lowercase(),
        _ => return url,
    };

    match scheme.as_str() {
        "http" | "https" | "mailto" => url,
        _ => {
            log::warn!("⚠️ Dropped link with unsafe scheme '{}' from model output", scheme);
            CowStr::Borrowed("#")
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Single pass, so placeholder-looking user text is never expanded.
fn fill(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match values.iter().find(|(name, _)| *name == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_renders_headings_and_lists() {
        let html = markdown_to_html("# Tomato Egg\n\n## Cooking steps\n1. Beat eggs\n2. Fry");
        assert!(html.contains("<h1>Tomato Egg</h1>"));
        assert!(html.contains("<h2>Cooking steps</h2>"));
        assert!(html.contains("<li>Beat eggs</li>"));
    }

    #[test]
    fn test_markdown_neutralises_raw_html() {
        let html = markdown_to_html("Hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_markdown_neutralises_script_urls() {
        let html = markdown_to_html(
            "[Open recipe](javascript:alert(document.cookie)) ![pic](JavaScript:alert(1)) [x](data:text/html,hi)",
        );
        assert!(!html.to_lowercase().contains("javascript:"));
        assert!(!html.contains("data:"));
        assert!(html.contains(r##"<a href="#">Open recipe</a>"##));
        assert!(html.contains(r##"<img src="#" alt="pic" />"##));
    }

    #[test]
    fn test_markdown_keeps_safe_links() {
        let html = markdown_to_html(
            "[site](https://example.com/a) [mail](mailto:chef@example.com) [rel](/recipes#top)",
        );
        assert!(html.contains(r#"href="https://example.com/a""#));
        assert!(html.contains(r#"href="mailto:chef@example.com""#));
        assert!(html.contains(r#"href="/recipes#top""#));
    }

    #[test]
    fn test_safe_url_ignores_whitespace_tricks() {
        assert_eq!(&*safe_url(CowStr::Borrowed(" java\tscript:alert(1)")), "#");
        assert_eq!(&*safe_url(CowStr::Borrowed("java\nscript:alert(1)")), "#");
        assert_eq!(&*safe_url(CowStr::Borrowed("HTTPS://example.com")), "HTTPS://example.com");
        assert_eq!(&*safe_url(CowStr::Borrowed("steps?step=1:2")), "steps?step=1:2");
    }

    #[test]
    fn test_render_shows_upload_phase() {
        assert_eq!(render_phase(UploadPhase::Idle), "");
        assert!(render_phase(UploadPhase::Populated).contains("Ingredients recognised"));
        assert!(render_phase(UploadPhase::Failed).contains("Recognition failed"));
    }

    #[test]
    fn test_fill_is_single_pass() {
        let out = fill(
            "A {{one}} B {{two}} C {{missing}}",
            &[("one", "{{two}}".to_string()), ("two", "2".to_string())],
        );
        assert_eq!(out, "A {{two}} B 2 C {{missing}}");
    }

    #[test]
    fn test_render_escapes_session_text() {
        let session = SessionController::new();
        let page = render(&session, Some(&Notice::Error("<b>bad</b>".to_string())));
        assert!(page.contains(r#"<div class="notice error">&lt;b&gt;bad&lt;/b&gt;</div>"#));
        assert!(!page.contains("{{ingredients}}"));
        assert!(!page.contains("{{result}}"));
    }

    #[test]
    fn test_render_failed_recipe_as_error() {
        let html = render_result(&RecipeOutcome::Failed("timeout".to_string()));
        assert!(html.contains("notice error"));
        assert!(html.contains("timeout"));
    }
}
