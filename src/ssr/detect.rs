// src/ssr/detect.rs

use std::sync::LazyLock;

use axum::http::Method;
use regex::Regex;

/// Content routes of the single-page application that have a meta document.
static CONTENT_ROUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(blog|dynamics|teachers|exercises)(?:/([^/]+))?/?$").unwrap()
});

/// Lowercase User-Agent fragments of link-preview crawlers, search engines
/// and preview tools.
const BOT_AGENTS: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "linkedinbot",
    "slackbot",
    "slack-imgproxy",
    "discordbot",
    "whatsapp",
    "telegrambot",
    "skypeuripreview",
    "pinterest",
    "redditbot",
    "applebot",
    "googlebot",
    "google-inspectiontool",
    "bingbot",
    "yandex",
    "duckduckbot",
    "baiduspider",
    "embedly",
    "vkshare",
    "quora link preview",
    "outbrain",
    "iframely",
    "mastodon",
    "bitlybot",
    "w3c_validator",
    "opengraph",
    "metainspector",
];

/// A content page that can be described with meta tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsrRoute {
    BlogIndex,
    Blog(String),
    DynamicsIndex,
    Dynamic(String),
    TeachersIndex,
    Teacher(String),
    ExercisesIndex,
    Exercise(String),
}

impl SsrRoute {
    /// Path of the page on the public site, e.g. `/blog/hello-world`.
    pub fn path(&self) -> String {
        match self {
            SsrRoute::BlogIndex => "/blog".to_string(),
            SsrRoute::Blog(slug) => format!("/blog/{}", slug),
            SsrRoute::DynamicsIndex => "/dynamics".to_string(),
            SsrRoute::Dynamic(slug) => format!("/dynamics/{}", slug),
            SsrRoute::TeachersIndex => "/teachers".to_string(),
            SsrRoute::Teacher(user_id) => format!("/teachers/{}", user_id),
            SsrRoute::ExercisesIndex => "/exercises".to_string(),
            SsrRoute::Exercise(id) => format!("/exercises/{}", id),
        }
    }
}

/// Maps a request path to a content route. API paths and paths whose last
/// segment looks like a file (`/blog/app.js`) never match.
pub fn match_route(path: &str) -> Option<SsrRoute> {
    if path == "/api" || path.starts_with("/api/") {
        return None;
    }
    let last_segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        return None;
    }

    let caps = CONTENT_ROUTE.captures(path)?;
    let section = caps.get(1)?.as_str();
    let id = caps.get(2).map(|m| m.as_str().to_string());

    let route = match (section, id) {
        ("blog", None) => SsrRoute::BlogIndex,
        ("blog", Some(slug)) => SsrRoute::Blog(slug),
        ("dynamics", None) => SsrRoute::DynamicsIndex,
        ("dynamics", Some(slug)) => SsrRoute::Dynamic(slug),
        ("teachers", None) => SsrRoute::TeachersIndex,
        ("teachers", Some(user_id)) => SsrRoute::Teacher(user_id),
        ("exercises", None) => SsrRoute::ExercisesIndex,
        ("exercises", Some(id)) => SsrRoute::Exercise(id),
        _ => return None,
    };
    Some(route)
}

pub fn is_bot(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    // Generic "SomeBot/1.0 (+http://...)" agents.
    (ua.contains("bot") && ua.contains("+http")) || BOT_AGENTS.iter().any(|bot| ua.contains(bot))
}

/// Request facts the gate decides on.
#[derive(Debug, Clone, Copy)]
pub struct Visitor<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub user_agent: Option<&'a str>,
    pub referer: Option<&'a str>,
}

/// Returns the route to describe when this visitor should get the meta
/// document instead of the application shell.
///
/// Bots always get it. With `direct_links`, so does any request without a
/// Referer, which is how shared links usually arrive.
pub fn classify(visitor: &Visitor<'_>, direct_links: bool) -> Option<SsrRoute> {
    if visitor.method != Method::GET && visitor.method != Method::HEAD {
        return None;
    }
    let route = match_route(visitor.path)?;

    if visitor.user_agent.is_some_and(is_bot) {
        return Some(route);
    }
    let no_referer = visitor.referer.is_none_or(|r| r.trim().is_empty());
    if direct_links && no_referer {
        return Some(route);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACEBOOK: &str = "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";
    const CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

    fn visitor<'a>(method: &'a Method, path: &'a str, ua: &'a str, referer: Option<&'a str>) -> Visitor<'a> {
        Visitor {
            method,
            path,
            user_agent: Some(ua),
            referer,
        }
    }

    #[test]
    fn matches_detail_and_index_routes() {
        assert_eq!(match_route("/blog/hello-world"), Some(SsrRoute::Blog("hello-world".into())));
        assert_eq!(match_route("/blog"), Some(SsrRoute::BlogIndex));
        assert_eq!(match_route("/teachers/u-1/"), Some(SsrRoute::Teacher("u-1".into())));
        assert_eq!(match_route("/exercises/abc"), Some(SsrRoute::Exercise("abc".into())));
        assert_eq!(match_route("/dynamics"), Some(SsrRoute::DynamicsIndex));
    }

    #[test]
    fn rejects_api_assets_and_unknown_routes() {
        assert_eq!(match_route("/api/posts"), None);
        assert_eq!(match_route("/blog/logo.png"), None);
        assert_eq!(match_route("/blog/a/b"), None);
        assert_eq!(match_route("/about"), None);
        assert_eq!(match_route("/"), None);
    }

    #[test]
    fn recognises_crawlers() {
        assert!(is_bot(FACEBOOK));
        assert!(is_bot("Twitterbot/1.0"));
        assert!(is_bot("WhatsApp/2.23.20.0"));
        assert!(is_bot("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"));
        assert!(!is_bot(CHROME));
    }

    #[test]
    fn bots_get_meta_documents() {
        let get = Method::GET;
        let route = classify(&visitor(&get, "/blog/hello", FACEBOOK, Some("https://x.com")), false);
        assert_eq!(route, Some(SsrRoute::Blog("hello".into())));
    }

    #[test]
    fn browsers_get_the_shell_unless_direct_links_are_enabled() {
        let get = Method::GET;
        assert_eq!(classify(&visitor(&get, "/blog/hello", CHROME, None), false), None);
        assert_eq!(
            classify(&visitor(&get, "/blog/hello", CHROME, None), true),
            Some(SsrRoute::Blog("hello".into()))
        );
        assert_eq!(
            classify(&visitor(&get, "/blog/hello", CHROME, Some("https://ieduguide.com/blog")), true),
            None
        );
    }

    #[test]
    fn only_safe_methods_are_eligible() {
        let post = Method::POST;
        assert_eq!(classify(&visitor(&post, "/blog/hello", FACEBOOK, None), true), None);
    }

    #[test]
    fn route_paths_round_trip() {
        assert_eq!(SsrRoute::Dynamic("icebreaker".into()).path(), "/dynamics/icebreaker");
        assert_eq!(SsrRoute::TeachersIndex.path(), "/teachers");
    }
}
