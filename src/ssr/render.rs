// src/ssr/render.rs

use url::Url;

use crate::utils::html::{collapse_whitespace, escape_attr, truncate_chars};

pub const DEFAULT_IMAGE: &str = "https://ieduguide.com/images/default-og.jpg";
pub const DEFAULT_BLOG_IMAGE: &str = "https://ieduguide.com/images/default-blog.jpg";
pub const DYNAMICS_IMAGE: &str = "https://ieduguide.com/images/dynamics-og.jpg";
pub const TEACHER_IMAGE: &str = "https://ieduguide.com/images/teacher-default.jpg";
pub const EXERCISE_IMAGE: &str = "https://ieduguide.com/images/exercise-og.jpg";
const FAVICON: &str = "https://ieduguide.com/images/discussion.jpg";

/// Longest description placed in meta tags.
pub const DESCRIPTION_LIMIT: usize = 160;

/// Everything a link preview needs to know about one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    /// Canonical URL; also the redirect target.
    pub url: String,
    /// `og:type`: `website`, `article` or `profile`.
    pub kind: &'static str,
    pub author: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
}

impl SeoMeta {
    pub fn website(title: impl Into<String>, description: impl Into<String>, url: String) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: DEFAULT_IMAGE.to_string(),
            url,
            kind: "website",
            author: None,
            published_time: None,
            modified_time: None,
        }
    }
}

/// Joins a site path onto the site URL, percent-encoding as needed.
pub fn canonical_url(site_url: &str, path: &str) -> String {
    Url::parse(site_url)
        .and_then(|base| base.join(path))
        .map(String::from)
        .unwrap_or_else(|_| format!("{}{}", site_url.trim_end_matches('/'), path))
}

/// Crawlers cannot fetch inline `data:` images; use `fallback` for those and for blanks.
pub fn preview_image(candidate: Option<&str>, fallback: &str) -> String {
    match candidate.map(str::trim) {
        Some(url) if !url.is_empty() && !url.starts_with("data:") => url.to_string(),
        _ => fallback.to_string(),
    }
}

/// Trims a description to the meta-tag limit.
pub fn clip_description(text: &str) -> String {
    truncate_chars(text, DESCRIPTION_LIMIT)
}

/// Like `clip_description`, but marks a cut with `...` inside the limit.
pub fn excerpt(text: &str) -> String {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return text.to_string();
    }
    let clipped = truncate_chars(text, DESCRIPTION_LIMIT - 3);
    format!("{}...", clipped.trim_end())
}

/// `SNAKE_CASE` enum-ish values as lowercase words; only the first `_` is replaced.
pub fn humanize(value: &str) -> String {
    value.replacen('_', " ", 1).to_lowercase()
}

fn clean(text: &str) -> String {
    escape_attr(&collapse_whitespace(text))
}

/// Renders the meta document: tags for crawlers and an immediate redirect
/// to the application page for anyone else.
pub fn render_document(meta: &SeoMeta) -> String {
    let title = clean(&meta.title);
    let description = clean(&meta.description);
    let image = escape_attr(&meta.image);
    let url = escape_attr(&meta.url);
    let kind = meta.kind;

    let mut article_tags = String::new();
    if let Some(author) = &meta.author {
        article_tags.push_str(&format!(
            "\n    <meta property=\"article:author\" content=\"{}\">",
            clean(author)
        ));
    }
    if let Some(published) = &meta.published_time {
        article_tags.push_str(&format!(
            "\n    <meta property=\"article:published_time\" content=\"{}\">",
            escape_attr(published)
        ));
    }
    if let Some(modified) = &meta.modified_time {
        article_tags.push_str(&format!(
            "\n    <meta property=\"article:modified_time\" content=\"{}\">",
            escape_attr(modified)
        ));
    }

    // JSON string literal, with `</` broken up so it cannot close the script.
    let script_url = serde_json::to_string(&meta.url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <meta name="robots" content="index, follow">
    <link rel="canonical" href="{url}">

    <meta property="og:title" content="{title}">
    <meta property="og:description" content="{description}">
    <meta property="og:image" content="{image}">
    <meta property="og:url" content="{url}">
    <meta property="og:type" content="{kind}">
    <meta property="og:site_name" content="EduGuiders">
    <meta property="og:locale" content="en_US">{article_tags}

    <meta name="twitter:card" content="summary_large_image">
    <meta name="twitter:title" content="{title}">
    <meta name="twitter:description" content="{description}">
    <meta name="twitter:image" content="{image}">
    <meta name="twitter:site" content="@EduGuiders">

    <link rel="icon" type="image/jpeg" href="{FAVICON}">
    <meta http-equiv="refresh" content="0; url={url}">
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; padding: 50px; background-color: #f5f5f5; }}
        .container {{ max-width: 600px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }}
        h1 {{ color: #333; }}
        p {{ color: #666; margin: 20px 0; }}
        a {{ color: #A47BB9; text-decoration: none; font-weight: bold; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>EduGuiders</h1>
        <p>Redirecting to: {title}</p>
        <p>If you're not redirected automatically, <a href="{url}">click here</a>.</p>
    </div>
    <script>window.location.replace({script_url});</script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> SeoMeta {
        SeoMeta {
            title: "Hello \"World\" - EduGuiders Blog".into(),
            description: "Line one\nline   two".into(),
            image: DEFAULT_BLOG_IMAGE.into(),
            url: "https://ieduguide.com/blog/hello-world".into(),
            kind: "article",
            author: Some("Ana".into()),
            published_time: Some("2024-01-01T00:00:00.000Z".into()),
            modified_time: None,
        }
    }

    #[test]
    fn renders_escaped_tags() {
        let html = render_document(&article());
        assert!(html.contains(
            r#"<meta property="og:title" content="Hello &quot;World&quot; - EduGuiders Blog">"#
        ));
        assert!(html.contains(r#"<meta name="description" content="Line one line two">"#));
        assert!(html.contains(r#"<meta property="og:type" content="article">"#));
        assert!(html.contains(r#"<meta property="article:author" content="Ana">"#));
        assert!(!html.contains("article:modified_time"));
    }

    #[test]
    fn redirects_to_canonical_url() {
        let html = render_document(&article());
        assert!(html.contains(r#"<link rel="canonical" href="https://ieduguide.com/blog/hello-world">"#));
        assert!(html.contains(r#"content="0; url=https://ieduguide.com/blog/hello-world""#));
        assert!(html.contains(r#"window.location.replace("https://ieduguide.com/blog/hello-world");"#));
    }

    #[test]
    fn script_url_cannot_break_out() {
        let mut meta = article();
        meta.url = "https://ieduguide.com/blog/</script><script>alert(1)".into();
        let html = render_document(&meta);
        assert!(!html.contains("</script><script>alert(1)"));
    }

    #[test]
    fn data_uris_fall_back() {
        assert_eq!(
            preview_image(Some("data:image/png;base64,AAAA"), DEFAULT_BLOG_IMAGE),
            DEFAULT_BLOG_IMAGE
        );
        assert_eq!(preview_image(Some(""), TEACHER_IMAGE), TEACHER_IMAGE);
        assert_eq!(
            preview_image(Some("https://cdn.example.com/a.jpg"), DEFAULT_IMAGE),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn canonical_urls_are_encoded() {
        assert_eq!(
            canonical_url("https://ieduguide.com", "/blog/hello-world"),
            "https://ieduguide.com/blog/hello-world"
        );
        assert_eq!(
            canonical_url("https://ieduguide.com/", "/blog/a b"),
            "https://ieduguide.com/blog/a%20b"
        );
    }

    #[test]
    fn excerpts_stay_within_the_limit() {
        assert_eq!(excerpt("Short body"), "Short body");

        let long = "word ".repeat(60);
        let cut = excerpt(long.trim());
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= DESCRIPTION_LIMIT);

        let exact = "x".repeat(DESCRIPTION_LIMIT);
        assert_eq!(excerpt(&exact), exact);
    }

    #[test]
    fn humanizes_first_underscore_only() {
        assert_eq!(humanize("FILL_IN_BLANK"), "fill in_blank");
        assert_eq!(humanize("TEENS"), "teens");
    }
}
