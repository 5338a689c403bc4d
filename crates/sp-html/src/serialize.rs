//! Markup serialization for documents and subtrees.

use crate::is_void;
use crate::tokenizer::is_raw_text_tag;
use sp_dom::Document;
use sp_dom::NodeData;
use sp_dom::NodeId;

/// Serializes the whole document, prefixed with an HTML5 doctype.
pub fn to_html(document: &Document) -> String {
    let mut out = String::from("<!DOCTYPE html>");
    write_children(document, document.root(), false, &mut out);
    out
}

pub fn outer_html(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(document, node, false, &mut out);
    out
}

pub fn inner_html(document: &Document, node: NodeId) -> String {
    let mut out = String::new();
    let raw = document.tag_name(node).is_some_and(is_raw_text_tag);
    write_children(document, node, raw, &mut out);
    out
}

fn write_children(document: &Document, node: NodeId, raw: bool, out: &mut String) {
    for child in document.children(node) {
        write_node(document, *child, raw, out);
    }
}

fn write_node(document: &Document, node: NodeId, raw: bool, out: &mut String) {
    match document.data(node) {
        Some(NodeData::Document) => write_children(document, node, false, out),
        Some(NodeData::Text(text)) => {
            if raw {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        Some(NodeData::Element(element)) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');

            if is_void(&element.tag) {
                return;
            }

            write_children(document, node, is_raw_text_tag(&element.tag), out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
        None => {}
    }
}

fn escape_into(input: &str, attribute: bool, out: &mut String) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}
