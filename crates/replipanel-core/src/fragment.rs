//! Fragment markup scanning
//!
//! Server-rendered fragments carry their own wiring as data attributes:
//! the root element names the subtree path, entry elements name the entry
//! path and implementation type, and an optional title element carries the
//! hover hint. This module extracts those bindings without a DOM: opening
//! tags are found with a regex, attributes are read from the tag text, and
//! element extents are found by counting open/close tags of the same name.

use std::sync::LazyLock;

use regex::Regex;

use crate::entry::ConfigEntry;

/// An opening tag, the only HTML structure the scanners rely on.
static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][^>]*>").expect("valid tag pattern"));

/// One attribute inside a tag, double- or single-quoted.
static ATTR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z][A-Za-z0-9_:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid attribute pattern")
});

/// The opening tag of the element carrying the display title.
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<[A-Za-z][^>]*data-role\s*=\s*['"]title['"][^>]*>"#)
        .expect("valid title pattern")
});

/// Title affordance of a node fragment: the label text plus the hover hint
/// from the element's `title` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleBinding {
    pub text: String,
    pub hint: Option<String>,
}

/// The wiring of one entry element inside a setup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryElement {
    pub entry: ConfigEntry,
    /// Entries rendered read-only are listed but get no interactive view.
    pub editable: bool,
    /// The element's full markup, from its opening tag to its closing tag.
    pub markup: String,
}

/// Read a named attribute out of an opening tag's text.
fn tag_attr(tag: &str, name: &str) -> Option<String> {
    ATTR_PATTERN.captures_iter(tag).find_map(|caps| {
        let attr = caps.get(1)?.as_str();
        if !attr.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3))?;
        Some(value.as_str().to_string())
    })
}

fn first_tag(markup: &str) -> Option<&str> {
    TAG_PATTERN.find(markup).map(|m| m.as_str())
}

fn tag_name(tag: &str) -> &str {
    tag[1..]
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("")
}

/// `data-path` of the fragment's root element.
pub fn data_path(markup: &str) -> Option<String> {
    tag_attr(first_tag(markup)?, "data-path")
}

/// `data-type` of the fragment's root element.
pub fn data_type(markup: &str) -> Option<String> {
    tag_attr(first_tag(markup)?, "data-type")
}

/// Case-insensitive tag marker match with a boundary check, so `<div`
/// does not match `<divider`.
fn starts_with_marker(rest: &str, marker: &str) -> bool {
    let Some(head) = rest.get(..marker.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(marker) {
        return false;
    }
    match rest[marker.len()..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || c == '>' || c == '/',
    }
}

/// Extent of the element whose opening tag starts at `open_start`.
///
/// Counts open and close tags of the same name so nested containers of the
/// same kind do not cut the block short. Unbalanced markup yields the rest
/// of the input.
fn element_block<'a>(markup: &'a str, open_start: usize, open_tag: &str) -> &'a str {
    if open_tag.ends_with("/>") {
        return &markup[open_start..open_start + open_tag.len()];
    }
    let name = tag_name(open_tag);
    if name.is_empty() {
        return &markup[open_start..];
    }
    let open_marker = format!("<{name}");
    let close_marker = format!("</{name}");

    let mut depth = 0usize;
    let mut pos = open_start;
    while let Some(found) = markup[pos..].find('<') {
        let at = pos + found;
        let rest = &markup[at..];
        let tag_end = rest
            .find('>')
            .map(|i| at + i + 1)
            .unwrap_or(markup.len());
        if starts_with_marker(rest, &close_marker) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return &markup[open_start..tag_end];
            }
        } else if starts_with_marker(rest, &open_marker) {
            // self-closing same-name tags do not nest
            if !markup[at..tag_end].trim_end().ends_with("/>") {
                depth += 1;
            }
        }
        pos = if tag_end > at { tag_end } else { at + 1 };
    }
    &markup[open_start..]
}

/// Collect the per-entry wiring from a setup fragment.
///
/// Entry elements are the tags carrying both `data-path` and `data-type`;
/// the fragment's root carries only `data-path` and is skipped naturally.
/// The returned markup spans the whole element, so entries are expected to
/// be siblings in the list region rather than nested in one another.
pub fn scan_entries(markup: &str) -> Vec<EntryElement> {
    let mut entries = Vec::new();
    for tag in TAG_PATTERN.find_iter(markup) {
        let text = tag.as_str();
        let (Some(path), Some(entry_type)) =
            (tag_attr(text, "data-path"), tag_attr(text, "data-type"))
        else {
            continue;
        };
        let editable = tag_attr(text, "data-editable").as_deref() == Some("true");
        let block = element_block(markup, tag.start(), text);
        entries.push(EntryElement {
            entry: ConfigEntry::new(path, entry_type),
            editable,
            markup: block.to_string(),
        });
    }
    entries
}

/// Extract the title affordance from a node fragment, if present.
pub fn title_binding(markup: &str) -> Option<TitleBinding> {
    let found = TITLE_PATTERN.find(markup)?;
    let hint = tag_attr(found.as_str(), "title");
    let text = markup[found.end()..]
        .split('<')
        .next()
        .unwrap_or("")
        .trim()
        .to_string();
    Some(TitleBinding { text, hint })
}
