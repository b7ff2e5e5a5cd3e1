//! Text-level markup primitives used by the handlers.
//!
//! These operate on component source as plain text: opening tags are found
//! with a regex, utility classes are rewritten in place, and the page file is
//! edited line by line. JSX attributes containing `>` (arrow functions) end
//! a tag match early.

use pagewright_core::{ColorProperty, Preposition};
use regex_lite::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z][A-Za-z0-9.]*)(\s[^<>]*)?>").expect("opening tag pattern compiles")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:className|class)\s*=\s*(?:"([^"]*)"|'([^']*)'|\{\s*`([^`]*)`\s*\})"#)
        .expect("class attribute pattern compiles")
});

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\sid\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("id attribute pattern compiles")
});

static COLOR_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(^|[\s"'`{])(bg|text|border)-((?:[a-z]+-\d{2,3})|white|black|transparent|\[#[0-9A-Fa-f]{3,8}\])"#,
    )
    .expect("color class pattern compiles")
});

static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\ssrc\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\})"#).expect("src attribute pattern compiles")
});

static YOUTUBE_WATCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|m\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/)([A-Za-z0-9_-]{6,})")
        .expect("youtube pattern compiles")
});

static YOUTU_BE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?youtu\.be/([A-Za-z0-9_-]{6,})").expect("youtu.be pattern compiles")
});

static VIMEO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?(?:www\.|player\.)?vimeo\.com/(?:video/)?(\d+)").expect("vimeo pattern compiles")
});

const PALETTE: [&str; 22] = [
    "slate", "gray", "zinc", "neutral", "stone", "red", "orange", "amber", "yellow", "lime",
    "green", "emerald", "teal", "cyan", "sky", "blue", "indigo", "violet", "purple", "fuchsia",
    "pink", "rose",
];

/// An opening tag located in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Byte offset of `<`
    pub start: usize,
    /// Byte offset just past `>`
    pub end: usize,
}

impl Element {
    pub fn is_self_closing(&self, doc: &str) -> bool {
        doc[self.start..self.end].trim_end_matches('>').trim_end().ends_with('/')
    }
}

/// Tag names a friendly selector ("headline", "button") stands for, in
/// preference order.
fn selector_tags(selector: &str) -> Vec<String> {
    let tags: &[&str] = match selector.trim().to_lowercase().as_str() {
        "headline" | "heading" | "title" | "header text" => &["h1", "h2"],
        "subheadline" | "subheading" | "subtitle" | "tagline" => &["h2", "p"],
        "button" | "cta" | "call to action" => &["button", "a"],
        "link" => &["a", "link"],
        "paragraph" | "description" | "body text" | "copy" => &["p"],
        "image" | "picture" | "photo" => &["img", "image"],
        "video" | "embed" | "player" => &["iframe", "video"],
        "background" | "container" | "wrapper" => &["section", "div"],
        _ => return vec![selector.trim().to_string()],
    };
    tags.iter().map(|t| t.to_string()).collect()
}

fn class_list(attrs: &str) -> Vec<String> {
    CLASS_ATTR
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)))
        .map(|m| m.as_str().split_whitespace().map(String::from).collect())
        .unwrap_or_default()
}

fn id_value(attrs: &str) -> Option<String> {
    ID_ATTR
        .captures(attrs)
        .and_then(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| m.as_str().to_string())
}

fn opening_tags(doc: &str) -> impl Iterator<Item = (Element, &str)> {
    OPENING_TAG.captures_iter(doc).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1)?.as_str().to_string();
        let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        Some((
            Element {
                name,
                start: whole.start(),
                end: whole.end(),
            },
            attrs,
        ))
    })
}

/// Find the first element matching `selector`: `.class`, `#id`, a tag name,
/// or a friendly alias.
pub fn find_element(doc: &str, selector: &str) -> Option<Element> {
    let selector = selector.trim();
    if let Some(class) = selector.strip_prefix('.') {
        return opening_tags(doc)
            .find(|(_, attrs)| class_list(attrs).iter().any(|c| c == class))
            .map(|(el, _)| el);
    }
    if let Some(id) = selector.strip_prefix('#') {
        return opening_tags(doc)
            .find(|(_, attrs)| id_value(attrs).as_deref() == Some(id))
            .map(|(el, _)| el);
    }
    for tag in selector_tags(selector) {
        if let Some((el, _)) = opening_tags(doc).find(|(el, _)| el.name.eq_ignore_ascii_case(&tag)) {
            return Some(el);
        }
    }
    None
}

/// Color value → utility-class color token (`blue` → `blue-600`,
/// `#1d4ed8` → `[#1d4ed8]`, `dark green` → `green-800`).
pub fn color_token(color: &str) -> String {
    let color = color.trim().to_lowercase();
    if color.starts_with('#') {
        return format!("[{color}]");
    }
    if color.starts_with('[') || matches!(color.as_str(), "white" | "black" | "transparent") {
        return color;
    }

    let mut shade = "600";
    let mut base = String::new();
    for word in color.split(|c: char| c.is_whitespace() || c == '-') {
        match word {
            "" => {}
            "dark" | "deep" => shade = "800",
            "light" | "pale" => shade = "300",
            "grey" => base = "gray".into(),
            w if w.chars().all(|c| c.is_ascii_digit()) => shade = w,
            w => base = w.to_string(),
        }
    }

    if PALETTE.contains(&base.as_str()) {
        format!("{base}-{shade}")
    } else {
        // Any CSS color name works as an arbitrary value
        format!("[{}]", color.replace(' ', ""))
    }
}

fn color_matches(token: &str, old: &str) -> bool {
    let old = old.trim().to_lowercase();
    if old.starts_with('#') {
        return token.eq_ignore_ascii_case(&format!("[{old}]"));
    }
    let normalized = color_token(&old);
    let base = normalized.split('-').next().unwrap_or(&normalized);
    token == normalized || token == base || token.starts_with(&format!("{base}-"))
}

/// Rewrite `bg-*`, `text-*` or `border-*` color classes.
///
/// With a selector only the first matching element's opening tag is touched;
/// when it carries no class of that family one is appended. Without a
/// selector every class of the family in the document is rewritten. Returns
/// the new document and the number of rewrites.
pub fn rewrite_color_classes(
    doc: &str,
    property: ColorProperty,
    color: &str,
    old_color: Option<&str>,
    selector: Option<&str>,
) -> (String, usize) {
    let prefix = property.class_prefix();
    let new_class = format!("{prefix}-{}", color_token(color));

    let rewrite = |region: &str| -> (String, usize) {
        let mut count = 0;
        let out = COLOR_CLASS.replace_all(region, |caps: &Captures| {
            let lead = &caps[1];
            let matched_prefix = &caps[2];
            let token = &caps[3];
            let old_ok = old_color.is_none_or(|old| color_matches(token, old));
            if matched_prefix == prefix && old_ok {
                count += 1;
                format!("{lead}{new_class}")
            } else {
                caps[0].to_string()
            }
        });
        (out.into_owned(), count)
    };

    let Some(selector) = selector else {
        return rewrite(doc);
    };
    let Some(el) = find_element(doc, selector) else {
        return (doc.to_string(), 0);
    };

    let tag = &doc[el.start..el.end];
    let (mut new_tag, mut count) = rewrite(tag);
    if count == 0 && old_color.is_none() {
        if let Some(appended) = append_class(tag, &el.name, &new_class) {
            new_tag = appended;
            count = 1;
        }
    }
    (format!("{}{new_tag}{}", &doc[..el.start], &doc[el.end..]), count)
}

fn append_class(tag: &str, name: &str, class: &str) -> Option<String> {
    if let Some(caps) = CLASS_ATTR.captures(tag) {
        let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
        let mut out = tag.to_string();
        let insert = if value.as_str().trim().is_empty() {
            class.to_string()
        } else {
            format!(" {class}")
        };
        out.insert_str(value.end(), &insert);
        return Some(out);
    }
    let head = format!("<{name}");
    Some(tag.replacen(&head, &format!("{head} className=\"{class}\""), 1))
}

/// Replace every literal occurrence of `old`. Returns the count.
pub fn replace_text(doc: &str, old: &str, new: &str) -> (String, usize) {
    if old.is_empty() {
        return (doc.to_string(), 0);
    }
    let count = doc.matches(old).count();
    (doc.replace(old, new), count)
}

/// Replace the content between the first matching element's opening tag and
/// its closing tag.
pub fn replace_inner_text(doc: &str, selector: &str, new_text: &str) -> Option<String> {
    let el = find_element(doc, selector)?;
    if el.is_self_closing(doc) {
        return None;
    }
    let close = format!("</{}>", el.name);
    let offset = doc[el.end..].find(&close)?;
    Some(format!(
        "{}{new_text}{}",
        &doc[..el.end],
        &doc[el.end + offset..]
    ))
}

/// YouTube and Vimeo page URLs → their embeddable player URLs. Anything else
/// is returned unchanged.
pub fn normalize_video_url(url: &str) -> String {
    let url = url.trim();
    if let Some(caps) = YOUTUBE_WATCH.captures(url).or_else(|| YOUTU_BE.captures(url)) {
        return format!("https://www.youtube.com/embed/{}", &caps[1]);
    }
    if let Some(caps) = VIMEO.captures(url) {
        return format!("https://player.vimeo.com/video/{}", &caps[1]);
    }
    url.to_string()
}

/// Point the `src` of the first `<iframe>`/`<video>` (or the selected
/// element) at `url`.
pub fn replace_media_src(doc: &str, selector: Option<&str>, url: &str) -> Option<String> {
    let el = selector
        .and_then(|s| find_element(doc, s))
        .or_else(|| find_element(doc, "video"))?;
    let tag = &doc[el.start..el.end];
    let replacement = format!(" src=\"{url}\"");

    let new_tag = if SRC_ATTR.is_match(tag) {
        SRC_ATTR.replace(tag, NoExpand(&replacement)).into_owned()
    } else {
        let head = format!("<{}", el.name);
        tag.replacen(&head, &format!("{head}{replacement}"), 1)
    };
    Some(format!("{}{new_tag}{}", &doc[..el.start], &doc[el.end..]))
}

// --- Page registration ---

fn usage_pattern(name: &str) -> Option<Regex> {
    Regex::new(&format!(r"<{}(?:\s|/|>|$)", regex_lite::escape(name))).ok()
}

fn import_pattern(name: &str) -> Option<Regex> {
    Regex::new(&format!(
        r"^\s*import\s+\{{?\s*{}\s*\}}?\s+from\s",
        regex_lite::escape(name)
    ))
    .ok()
}

fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn split_lines(doc: &str) -> (Vec<String>, bool) {
    (doc.lines().map(String::from).collect(), doc.ends_with('\n'))
}

fn join_lines(lines: &[String], trailing_newline: bool) -> String {
    let mut out = lines.join("\n");
    if trailing_newline {
        out.push('\n');
    }
    out
}

/// Index of the last line of the element starting at `start`.
fn element_end_line(lines: &[String], start: usize, name: &str) -> usize {
    let close = format!("</{name}>");
    let first = &lines[start];
    if first.contains("/>") || first.contains(&close) {
        return start;
    }
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, l)| l.contains(&close) || l.trim_end().ends_with("/>"))
        .map(|(i, _)| i)
        .unwrap_or(start)
}

/// Index just past the import block, honoring a leading `"use client"`.
fn import_insert_index(lines: &[String]) -> usize {
    let mut insert_at = 0;
    if lines
        .first()
        .is_some_and(|l| l.trim().trim_end_matches(';').trim_matches(|c| c == '"' || c == '\'') == "use client")
    {
        insert_at = 1;
    }

    let mut in_import = false;
    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("import ") || trimmed == "import" {
            in_import = true;
        }
        if in_import && (trimmed.contains(" from ") || trimmed.starts_with("} from") || trimmed.ends_with(';')) {
            in_import = false;
            insert_at = idx + 1;
        }
    }
    insert_at
}

/// Import `name` into the page and place `<name />` relative to `anchor`
/// (`Below` ⇒ after it, `Above` ⇒ before it). Without a usable anchor the
/// usage goes before `</main>`, else before the last closing tag. Already
/// registered components are left as they are.
pub fn register_component(
    page: &str,
    name: &str,
    import_path: &str,
    anchor: Option<&str>,
    preposition: Preposition,
) -> String {
    let (mut lines, trailing) = split_lines(page);

    let already_imported = import_pattern(name).is_some_and(|re| lines.iter().any(|l| re.is_match(l)));
    if !already_imported {
        let at = import_insert_index(&lines);
        lines.insert(at, format!("import {name} from \"{import_path}\";"));
    }

    let usage = usage_pattern(name);
    let already_used = usage.as_ref().is_some_and(|re| lines.iter().any(|l| re.is_match(l)));
    if already_used {
        return join_lines(&lines, trailing);
    }

    let anchor_start = anchor.and_then(|a| {
        let re = usage_pattern(a)?;
        lines.iter().position(|l| re.is_match(l.trim_start()) && l.trim_start().starts_with('<'))
    });

    match (anchor, anchor_start) {
        (Some(anchor), Some(start)) => {
            let indent = indentation(&lines[start]).to_string();
            let element = format!("{indent}<{name} />");
            match preposition {
                Preposition::Above => lines.insert(start, element),
                Preposition::Below => {
                    let end = element_end_line(&lines, start, anchor);
                    lines.insert(end + 1, element);
                }
            }
        }
        _ => {
            let closing = lines
                .iter()
                .position(|l| l.contains("</main>"))
                .or_else(|| lines.iter().rposition(|l| l.trim_start().starts_with("</")));
            match closing {
                Some(idx) => {
                    let indent = format!("{}  ", indentation(&lines[idx]));
                    lines.insert(idx, format!("{indent}<{name} />"));
                }
                None => lines.push(format!("<{name} />")),
            }
        }
    }

    join_lines(&lines, trailing)
}

/// Remove the import and every usage of `name` from the page. Returns the
/// new page and whether anything changed.
pub fn unregister_component(page: &str, name: &str) -> (String, bool) {
    let (lines, trailing) = split_lines(page);
    let (Some(import), Some(usage)) = (import_pattern(name), usage_pattern(name)) else {
        return (page.to_string(), false);
    };

    let mut kept = Vec::with_capacity(lines.len());
    let mut changed = false;
    let mut idx = 0;
    while idx < lines.len() {
        let line = &lines[idx];
        let trimmed = line.trim_start();
        if import.is_match(line) {
            changed = true;
            idx += 1;
            continue;
        }
        if trimmed.starts_with('<') && usage.is_match(trimmed) {
            changed = true;
            idx = element_end_line(&lines, idx, name) + 1;
            continue;
        }
        kept.push(line.clone());
        idx += 1;
    }

    (join_lines(&kept, trailing), changed)
}
