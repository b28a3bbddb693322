// src/security/html.rs
// Output escaping, URL sanitation and the post-content HTML allow-list.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

use ammonia::Builder;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

const POST_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "article", "aside", "b", "bdo", "big", "blockquote", "br",
    "caption", "cite", "code", "col", "colgroup", "dd", "del", "details", "dfn", "div", "dl", "dt",
    "em", "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hgroup", "hr", "i", "img", "ins", "kbd", "li", "main", "mark", "nav", "ol", "p", "pre", "q",
    "s", "samp", "section", "small", "span", "strike", "strong", "sub", "summary", "sup", "table",
    "tbody", "td", "tfoot", "th", "thead", "time", "tr", "tt", "u", "ul", "var",
];

const GENERIC_ATTRIBUTES: &[&str] = &["class", "id", "lang", "dir", "title", "style", "align"];

const TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "rel", "target", "name", "hreflang"]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("td", &["colspan", "rowspan", "headers"]),
    ("th", &["colspan", "rowspan", "headers", "scope"]),
    ("ol", &["start", "reversed", "type"]),
    ("blockquote", &["cite"]),
    ("q", &["cite"]),
    ("del", &["cite", "datetime"]),
    ("ins", &["cite", "datetime"]),
    ("time", &["datetime"]),
];

const SAFE_CSS_PROPERTIES: &[&str] = &[
    "text-align", "text-decoration", "text-transform", "font-weight", "font-style", "font-size",
    "color", "background-color", "line-height", "letter-spacing", "margin", "margin-top",
    "margin-right", "margin-bottom", "margin-left", "padding", "padding-top", "padding-right",
    "padding-bottom", "padding-left", "width", "max-width", "height", "border", "border-radius",
    "vertical-align", "list-style-type",
];

const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

// Spaces and anything non-ASCII get percent-encoded; other ASCII is filtered first.
const URL_ESCAPE: &AsciiSet = &CONTROLS.add(b' ');

/// Escapes text for use in element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-~+_.?#=!&;,/:%@$|*'()[] ".contains(c) || !c.is_ascii()
}

/// Cleans a URL for storage: strips disallowed characters, percent-encodes
/// spaces and non-ASCII, rejects unknown protocols and gives scheme-less
/// values an `http://` prefix. Returns an empty string when nothing usable
/// remains.
pub fn sanitize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let filtered: String = trimmed.chars().filter(|c| is_url_char(*c)).collect();
    let mut url = utf8_percent_encode(&filtered, URL_ESCAPE).to_string();
    for newline in ["%0d", "%0a", "%0D", "%0A"] {
        while url.contains(newline) {
            url = url.replace(newline, "");
        }
    }
    if url.is_empty() {
        return url;
    }

    match url.find(':') {
        Some(idx) => {
            let scheme = url[..idx].to_ascii_lowercase();
            let is_relative = url.starts_with('/') || url.starts_with('#') || url.starts_with('?');
            if !is_relative && !ALLOWED_PROTOCOLS.contains(&scheme.as_str()) {
                return String::new();
            }
            url
        }
        None => {
            if url.starts_with('/') || url.starts_with('#') || url.starts_with('?') {
                url
            } else {
                format!("http://{}", url)
            }
        }
    }
}

fn filter_style(value: &str) -> Option<String> {
    let kept: Vec<String> = value
        .split(';')
        .filter_map(|decl| {
            let (prop, val) = decl.split_once(':')?;
            let prop = prop.trim().to_ascii_lowercase();
            let val = val.trim();
            if val.is_empty() || !SAFE_CSS_PROPERTIES.contains(&prop.as_str()) {
                return None;
            }
            let lowered = val.to_ascii_lowercase();
            if lowered.contains("url(")
                || lowered.contains("expression")
                || val.contains('\\')
                || val.contains('<')
                || val.contains('&')
            {
                return None;
            }
            Some(format!("{}: {}", prop, val))
        })
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(format!("{};", kept.join("; ")))
    }
}

fn attribute_filter<'u>(_element: &str, attribute: &str, value: &'u str) -> Option<Cow<'u, str>> {
    if attribute == "style" {
        return filter_style(value).map(Cow::Owned);
    }
    Some(Cow::Borrowed(value))
}

fn post_profile() -> Builder<'static> {
    let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = TAG_ATTRIBUTES
        .iter()
        .map(|(tag, attrs)| (*tag, attrs.iter().copied().collect()))
        .collect();
    let mut builder = Builder::default();
    builder
        .tags(POST_TAGS.iter().copied().collect())
        .generic_attributes(GENERIC_ATTRIBUTES.iter().copied().collect())
        .tag_attributes(tag_attributes)
        .link_rel(None)
        .attribute_filter(attribute_filter);
    builder
}

/// Rich-text sanitation for maintenance copy: common post markup survives,
/// scripts, event handlers and unsafe URLs do not.
pub fn sanitize_post_html(input: &str) -> String {
    if input.trim().is_empty() {
        return String::new();
    }
    post_profile().clean(input).to_string()
}
