//! CSS selector parsing and matching for `query_selector`.
//!
//! Supported: type, universal, `#id`, `.class`, attribute selectors
//! (`[a]`, `[a=v]`, `[a^=v]`, `[a$=v]`, `[a*=v]`, `[a~=v]`), the descendant and
//! child combinators, and comma-separated lists. Anything else is rejected with
//! `dom.selector.invalid` or `dom.selector.unsupported`.

use crate::Document;
use crate::ElementData;
use crate::NodeId;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;

/// Parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

/// Compound selectors ordered subject first, each with the combinator that links it
/// to the next (leftward) compound.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComplexSelector {
    segments: Vec<SelectorSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorSegment {
    compound: CompoundSelector,
    combinator_to_next: Option<Combinator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeSelector {
    name: String,
    matcher: AttributeMatcher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeMatcher {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
    Includes(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

impl SelectorList {
    pub fn parse(input: &str) -> SprinkleResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "selector is empty"));
        }

        let mut selectors = Vec::new();
        for part in split_selector_list(trimmed) {
            selectors.push(parse_complex(part.trim(), input)?);
        }
        Ok(Self { selectors })
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub(crate) fn matches(&self, document: &Document, node: NodeId) -> bool {
        self.selectors
            .iter()
            .any(|selector| matches_from(document, &selector.segments, 0, node))
    }
}

fn matches_from(document: &Document, segments: &[SelectorSegment], index: usize, node: NodeId) -> bool {
    let Some(segment) = segments.get(index) else {
        return true;
    };
    let Some(element) = document.element(node) else {
        return false;
    };
    if !segment.compound.matches(element) {
        return false;
    }

    match segment.combinator_to_next {
        None => true,
        Some(Combinator::Child) => document
            .parent(node)
            .is_some_and(|parent| matches_from(document, segments, index + 1, parent)),
        Some(Combinator::Descendant) => document
            .ancestors(node)
            .any(|ancestor| matches_from(document, segments, index + 1, ancestor)),
    }
}

impl CompoundSelector {
    fn matches(&self, element: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if &element.tag != tag {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.iter().all(|class_name| element.has_class(class_name)) {
            return false;
        }

        self.attributes.iter().all(|attribute| {
            let Some(value) = element.attr(&attribute.name) else {
                return false;
            };
            match &attribute.matcher {
                AttributeMatcher::Exists => true,
                AttributeMatcher::Equals(expected) => value == expected,
                AttributeMatcher::Prefix(expected) => {
                    !expected.is_empty() && value.starts_with(expected.as_str())
                }
                AttributeMatcher::Suffix(expected) => {
                    !expected.is_empty() && value.ends_with(expected.as_str())
                }
                AttributeMatcher::Substring(expected) => {
                    !expected.is_empty() && value.contains(expected.as_str())
                }
                AttributeMatcher::Includes(expected) => {
                    !expected.is_empty()
                        && !expected.contains(char::is_whitespace)
                        && value.split_ascii_whitespace().any(|word| word == expected)
                }
            }
        })
    }
}

fn split_selector_list(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0_usize;
    let mut quote: Option<u8> = None;
    let mut bracket_depth = 0_u32;

    for (idx, byte) in bytes.iter().copied().enumerate() {
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'[' => bracket_depth = bracket_depth.saturating_add(1),
            b']' => bracket_depth = bracket_depth.saturating_sub(1),
            b',' if bracket_depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx.saturating_add(1);
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn parse_complex(input: &str, original: &str) -> SprinkleResult<ComplexSelector> {
    if input.is_empty() {
        return Err(invalid(original, "empty entry in selector list"));
    }

    let bytes = input.as_bytes();
    let mut idx = 0_usize;
    let mut quote: Option<u8> = None;
    let mut bracket_depth = 0_u32;
    let mut pending_descendant = false;
    let mut compound = String::new();
    let mut compounds: Vec<String> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();

    while idx < bytes.len() {
        let byte = bytes[idx];

        if !byte.is_ascii() {
            if quote.is_none() && bracket_depth == 0 && pending_descendant {
                combinators.push(Combinator::Descendant);
                pending_descendant = false;
            }
            let end = next_char_boundary(input, idx);
            compound.push_str(&input[idx..end]);
            idx = end;
            continue;
        }

        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            compound.push(byte as char);
            idx = idx.saturating_add(1);
            continue;
        }

        if bracket_depth > 0 {
            match byte {
                b'\'' | b'"' => quote = Some(byte),
                b'[' => bracket_depth = bracket_depth.saturating_add(1),
                b']' => bracket_depth = bracket_depth.saturating_sub(1),
                _ => {}
            }
            compound.push(byte as char);
            idx = idx.saturating_add(1);
            continue;
        }

        match byte {
            b'[' => {
                if pending_descendant {
                    combinators.push(Combinator::Descendant);
                    pending_descendant = false;
                }
                bracket_depth = bracket_depth.saturating_add(1);
                compound.push('[');
            }
            b'>' => {
                let trimmed = compound.trim();
                if !trimmed.is_empty() {
                    compounds.push(trimmed.to_owned());
                    compound.clear();
                } else if compounds.is_empty() || !pending_descendant {
                    return Err(invalid(original, "child combinator without a left-hand side"));
                }
                pending_descendant = false;
                combinators.push(Combinator::Child);
            }
            b'+' | b'~' => {
                return Err(SprinkleError::new(
                    "dom.selector.unsupported",
                    format!("sibling combinators are not supported in `{original}`"),
                ));
            }
            _ if byte.is_ascii_whitespace() => {
                let trimmed = compound.trim();
                if !trimmed.is_empty() {
                    compounds.push(trimmed.to_owned());
                    compound.clear();
                    pending_descendant = true;
                } else if !compounds.is_empty() && combinators.len() < compounds.len() {
                    pending_descendant = true;
                }
            }
            _ => {
                if pending_descendant {
                    combinators.push(Combinator::Descendant);
                    pending_descendant = false;
                }
                compound.push(byte as char);
            }
        }

        idx = idx.saturating_add(1);
    }

    if quote.is_some() || bracket_depth > 0 {
        return Err(invalid(original, "unterminated attribute selector"));
    }

    let tail = compound.trim();
    if !tail.is_empty() {
        compounds.push(tail.to_owned());
    }
    if compounds.is_empty() || combinators.len() + 1 != compounds.len() {
        return Err(invalid(original, "dangling combinator"));
    }

    let mut segments = Vec::with_capacity(compounds.len());
    for (position, raw) in compounds.iter().enumerate().rev() {
        let combinator_to_next = position
            .checked_sub(1)
            .and_then(|left| combinators.get(left).copied());
        segments.push(SelectorSegment {
            compound: parse_compound(raw, original)?,
            combinator_to_next,
        });
    }

    Ok(ComplexSelector { segments })
}

fn parse_compound(input: &str, original: &str) -> SprinkleResult<CompoundSelector> {
    let mut selector = CompoundSelector::default();
    let bytes = input.as_bytes();
    let mut idx = 0_usize;

    if bytes.first() == Some(&b'*') {
        idx = 1;
    } else if let Some((tag, next)) = read_ident(input, 0) {
        selector.tag = Some(tag.to_ascii_lowercase());
        idx = next;
    }

    while idx < bytes.len() {
        match bytes[idx] {
            b'#' => {
                let (id, next) = read_ident(input, idx + 1)
                    .ok_or_else(|| invalid(original, "`#` must be followed by an identifier"))?;
                if selector.id.is_some() {
                    return Err(invalid(original, "compound selector has two ids"));
                }
                selector.id = Some(id);
                idx = next;
            }
            b'.' => {
                let (class_name, next) = read_ident(input, idx + 1)
                    .ok_or_else(|| invalid(original, "`.` must be followed by an identifier"))?;
                selector.classes.push(class_name);
                idx = next;
            }
            b'[' => {
                let close = find_attribute_end(bytes, idx + 1)
                    .ok_or_else(|| invalid(original, "unterminated attribute selector"))?;
                selector
                    .attributes
                    .push(parse_attribute(&input[idx + 1..close], original)?);
                idx = close + 1;
            }
            b':' => {
                return Err(SprinkleError::new(
                    "dom.selector.unsupported",
                    format!("pseudo-classes are not supported in `{original}`"),
                ));
            }
            _ => return Err(invalid(original, "unexpected character")),
        }
    }

    Ok(selector)
}

fn parse_attribute(inner: &str, original: &str) -> SprinkleResult<AttributeSelector> {
    let inner = inner.trim();
    let Some((name, mut idx)) = read_ident(inner, 0) else {
        return Err(invalid(original, "attribute selector needs a name"));
    };
    let name = name.to_ascii_lowercase();
    let bytes = inner.as_bytes();
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    if idx == bytes.len() {
        return Ok(AttributeSelector {
            name,
            matcher: AttributeMatcher::Exists,
        });
    }

    let (operator, value_start) = match (bytes[idx], bytes.get(idx + 1).copied()) {
        (b'=', _) => ('=', idx + 1),
        (op @ (b'^' | b'$' | b'*' | b'~'), Some(b'=')) => (op as char, idx + 2),
        _ => return Err(invalid(original, "unknown attribute operator")),
    };
    let value = parse_attribute_value(inner[value_start..].trim())
        .ok_or_else(|| invalid(original, "malformed attribute value"))?;

    let matcher = match operator {
        '=' => AttributeMatcher::Equals(value),
        '^' => AttributeMatcher::Prefix(value),
        '$' => AttributeMatcher::Suffix(value),
        '*' => AttributeMatcher::Substring(value),
        _ => AttributeMatcher::Includes(value),
    };
    Ok(AttributeSelector { name, matcher })
}

fn parse_attribute_value(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    match bytes.first().copied() {
        Some(quote @ (b'"' | b'\'')) => {
            let rest = &raw[1..];
            let end = rest.find(quote as char)?;
            if !rest[end + 1..].trim().is_empty() {
                return None;
            }
            Some(rest[..end].to_owned())
        }
        Some(_) => {
            let (ident, next) = read_ident(raw, 0)?;
            (next == raw.len()).then_some(ident)
        }
        None => None,
    }
}

fn find_attribute_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, byte) in bytes[from..].iter().copied().enumerate() {
        if let Some(open) = quote {
            if byte == open {
                quote = None;
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b']' => return Some(from + offset),
            _ => {}
        }
    }
    None
}

/// Reads a CSS identifier. Identifiers may not start with a digit or with a
/// hyphen followed by a digit.
fn read_ident(input: &str, start: usize) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    let first = *bytes.get(start)?;
    let starts_ok = match first {
        b'-' => bytes
            .get(start + 1)
            .is_some_and(|next| !next.is_ascii_digit()),
        _ => is_ident_start(first),
    };
    if !starts_ok {
        return None;
    }

    let mut idx = start;
    while idx < bytes.len() && is_ident_char(bytes[idx]) {
        idx += 1;
    }
    if idx == start || !input.is_char_boundary(idx) {
        return None;
    }
    Some((input[start..idx].to_owned(), idx))
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || !byte.is_ascii()
}

fn is_ident_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || !byte.is_ascii()
}

fn next_char_boundary(input: &str, idx: usize) -> usize {
    let mut end = idx + 1;
    while end < input.len() && !input.is_char_boundary(end) {
        end += 1;
    }
    end
}

fn invalid(selector: &str, reason: &str) -> SprinkleError {
    SprinkleError::new(
        "dom.selector.invalid",
        format!("`{selector}` is not a valid selector: {reason}"),
    )
}

#[cfg(test)]
mod tests {
    use super::SelectorList;
    use crate::Document;
    use crate::NodeId;

    fn el(doc: &mut Document, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = doc.create_element_with_attrs(
            tag,
            attrs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        );
        assert!(doc.append_child(parent, node).is_ok());
        node
    }

    #[test]
    fn matches_descendant_and_child_combinators() {
        let mut doc = Document::empty();
        let root = doc.root();
        let body = el(&mut doc, root, "body", &[]);
        let pre = el(&mut doc, body, "pre", &[]);
        let code = el(&mut doc, pre, "code", &[]);
        let stray = el(&mut doc, body, "code", &[]);

        assert_eq!(doc.query_selector_all(root, "pre code"), Ok(vec![code]));
        assert_eq!(doc.query_selector_all(root, "body > pre > code"), Ok(vec![code]));
        assert_eq!(doc.query_selector_all(root, "body > code"), Ok(vec![stray]));
        assert_eq!(doc.query_selector_all(root, "body code"), Ok(vec![code, stray]));
    }

    #[test]
    fn selector_lists_return_document_order() {
        let mut doc = Document::empty();
        let root = doc.root();
        let a = el(&mut doc, root, "div", &[("class", "tech-item")]);
        let b = el(&mut doc, root, "div", &[("class", "feature-card big")]);
        let c = el(&mut doc, root, "section", &[("class", "example-card")]);

        let found = doc.query_selector_all(
            root,
            ".feature-card, .screenshot-item, .tech-item, .example-card",
        );
        assert_eq!(found, Ok(vec![a, b, c]));
    }

    #[test]
    fn attribute_operators() {
        let mut doc = Document::empty();
        let root = doc.root();
        let local = el(&mut doc, root, "a", &[("href", "#intro")]);
        let external = el(&mut doc, root, "a", &[("href", "https://example.org/")]);
        let lazy = el(&mut doc, root, "img", &[("loading", "lazy"), ("data-src", "a.png")]);

        assert_eq!(doc.query_selector_all(root, "a[href^=\"#\"]"), Ok(vec![local]));
        assert_eq!(doc.query_selector_all(root, "a[href^='http']"), Ok(vec![external]));
        assert_eq!(doc.query_selector_all(root, "img[loading=lazy]"), Ok(vec![lazy]));
        assert_eq!(doc.query_selector_all(root, "[data-src$=\".png\"]"), Ok(vec![lazy]));
        assert_eq!(doc.query_selector_all(root, "[href*=example]"), Ok(vec![external]));
        assert_eq!(doc.query_selector_all(root, "[data-src]"), Ok(vec![lazy]));
    }

    #[test]
    fn id_lookup_is_case_sensitive() {
        let mut doc = Document::empty();
        let root = doc.root();
        let heading = el(&mut doc, root, "h2", &[("id", "Setup")]);
        assert_eq!(doc.query_selector(root, "#Setup"), Ok(Some(heading)));
        assert_eq!(doc.query_selector(root, "#setup"), Ok(None));
    }

    #[test]
    fn rejects_invalid_fragments() {
        for bad in ["#", "", "#1intro", "a >", "> a", "a[href", ".", "a,,b"] {
            let parsed = SelectorList::parse(bad);
            assert!(parsed.is_err(), "`{bad}` should be rejected");
        }
    }

    #[test]
    fn reports_unsupported_features_separately() {
        let parsed = SelectorList::parse("a:hover");
        assert!(parsed.is_err());
        if let Err(error) = parsed {
            assert_eq!(error.code, "dom.selector.unsupported");
        }
    }
}
