//! HTML tokenization, tree building and serialization.

mod serialize;
mod tokenizer;

use sp_dom::Document;
use sp_dom::NodeId;
use tokenizer::Token;

pub use serialize::inner_html;
pub use serialize::outer_html;
pub use serialize::to_html;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut document = Document::empty();
        let root = document.root();
        build_tree(&mut document, root, tokenizer::tokenize(input));
        document.title = find_title(&document).unwrap_or_default();
        document
    }
}

/// Replaces the children of `target` with the parsed `markup`, like `innerHTML`.
pub fn set_inner_html(document: &mut Document, target: NodeId, markup: &str) {
    document.set_text_content(target, "");
    build_tree(document, target, tokenizer::tokenize(markup));
}

fn build_tree(document: &mut Document, base: NodeId, tokens: Vec<Token>) {
    let mut stack = vec![base];

    for token in tokens {
        let current = stack.last().copied().unwrap_or(base);
        match token {
            Token::Text(text) | Token::RawText(text) => {
                let node = document.create_text(text);
                let _ = document.append_child(current, node);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                close_implied(document, &mut stack, &name);
                let parent = stack.last().copied().unwrap_or(base);
                let el = document.create_element_with_attrs(&name, attrs);
                let _ = document.append_child(parent, el);

                if !(self_closing || is_void(&name)) {
                    stack.push(el);
                }
            }
            Token::End { name } => {
                // Stray end tags with no open counterpart are ignored.
                let open_at = stack
                    .iter()
                    .skip(1)
                    .rposition(|node| document.tag_name(*node) == Some(name.as_str()));
                if let Some(position) = open_at {
                    stack.truncate(position + 1);
                }
            }
        }
    }
}

/// Closes elements whose end tag is optional when `incoming` opens.
fn close_implied(document: &Document, stack: &mut Vec<NodeId>, incoming: &str) {
    let Some(top) = stack.last().copied() else {
        return;
    };
    if stack.len() < 2 {
        return;
    }
    let top_tag = document.tag_name(top).unwrap_or_default();

    let closes = match top_tag {
        "p" => is_block(incoming),
        "li" => incoming == "li",
        "dt" | "dd" => matches!(incoming, "dt" | "dd"),
        "option" => incoming == "option",
        _ => false,
    };
    if closes {
        stack.pop();
    }
}

fn find_title(document: &Document) -> Option<String> {
    document
        .descendants(document.root())
        .find(|node| document.tag_name(*node) == Some("title"))
        .map(|node| collapse_whitespace(&document.text_content(node)))
        .filter(|title| !title.is_empty())
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "footer"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}
