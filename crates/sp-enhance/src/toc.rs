//! Table of contents for the main content region.

use crate::config::EnhanceConfig;
use crate::select_all_in;
use crate::select_first;
use sp_dom::Document;
use sp_html::set_inner_html;
use tracing::debug;

const TOC_SKELETON: &str = "<h3></h3><ul></ul>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLevel {
    H2,
    H3,
}

impl HeadingLevel {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h2" => Some(Self::H2),
            "h3" => Some(Self::H3),
            _ => None,
        }
    }

    /// Class given to the entry's list item.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::H2 => "h2",
            Self::H3 => "h3",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub level: HeadingLevel,
    pub text: String,
}

/// Entries in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocModel {
    pub entries: Vec<TocEntry>,
}

impl TocModel {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn heading_id(index: usize) -> String {
    format!("heading-{index}")
}

/// Builds the table and inserts it as the first child of the content region.
/// Returns `None` when the region is absent or holds too few headings.
pub fn build_table_of_contents(document: &mut Document, config: &EnhanceConfig) -> Option<TocModel> {
    let Some(content) = select_first(document, &config.selectors.content_body) else {
        debug!("no content region; table of contents skipped");
        return None;
    };

    let headings = select_all_in(document, content, &config.selectors.toc_headings)
        .into_iter()
        .filter_map(|heading| {
            let level = document.tag_name(heading).and_then(HeadingLevel::from_tag)?;
            Some((heading, level))
        })
        .collect::<Vec<_>>();
    if headings.len() <= config.toc.min_headings {
        debug!(headings = headings.len(), "too few headings for a table of contents");
        return None;
    }

    let toc = document.create_element_with_attrs(
        "div",
        vec![("class".to_owned(), config.toc.class.clone())],
    );
    set_inner_html(document, toc, TOC_SKELETON);
    let (title, list) = match document.children(toc) {
        [title, list] => (*title, *list),
        _ => return None,
    };
    document.set_text_content(title, &config.toc.title);

    let mut model = TocModel::default();
    for (index, (heading, level)) in headings.into_iter().enumerate() {
        // Ids are positional; an element elsewhere on the page may already carry one.
        let id = heading_id(index);
        document.set_attribute(heading, "id", &id);
        let text = document.text_content(heading);

        let item = document.create_element_with_attrs(
            "li",
            vec![("class".to_owned(), level.as_str().to_owned())],
        );
        let link = document.create_element_with_attrs("a", vec![("href".to_owned(), format!("#{id}"))]);
        document.set_text_content(link, &text);
        let placed = document
            .append_child(item, link)
            .and_then(|()| document.append_child(list, item));
        if let Err(error) = placed {
            debug!(%error, id = id.as_str(), "could not add table of contents entry");
            return None;
        }

        model.entries.push(TocEntry { id, level, text });
    }

    let first = document.first_child(content);
    if let Err(error) = document.insert_before(content, toc, first) {
        debug!(%error, "could not insert table of contents");
        return None;
    }
    Some(model)
}

#[cfg(test)]
mod tests {
    use super::HeadingLevel;
    use super::build_table_of_contents;
    use super::heading_id;
    use crate::config::EnhanceConfig;
    use proptest::prelude::*;
    use sp_html::HtmlParser;
    use sp_html::outer_html;

    fn content_page(headings: &[(&str, &str)]) -> String {
        let body = headings
            .iter()
            .map(|(tag, text)| format!("<{tag}>{text}</{tag}><p>text</p>"))
            .collect::<String>();
        format!(r#"<article class="content-body"><p>intro</p>{body}</article>"#)
    }

    #[test]
    fn builds_outline_as_first_child() {
        let mut doc = HtmlParser.parse(&content_page(&[
            ("h2", "Install"),
            ("h3", "From source"),
            ("h2", "Usage"),
        ]));
        let model = build_table_of_contents(&mut doc, &EnhanceConfig::default())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(model.len(), 3);
        assert_eq!(model.entries[1].level, HeadingLevel::H3);
        assert_eq!(model.entries[2].text, "Usage");

        let content = doc
            .query_selector(doc.root(), ".content-body")
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        let toc = doc.first_child(content).unwrap_or_else(|| unreachable!());
        assert_eq!(
            outer_html(&doc, toc),
            concat!(
                r#"<div class="table-of-contents"><h3>Table of Contents</h3><ul>"#,
                r##"<li class="h2"><a href="#heading-0">Install</a></li>"##,
                r##"<li class="h3"><a href="#heading-1">From source</a></li>"##,
                r##"<li class="h2"><a href="#heading-2">Usage</a></li>"##,
                "</ul></div>"
            )
        );
        for entry in &model.entries {
            let target = doc.query_selector(doc.root(), &format!("#{}", entry.id));
            assert!(matches!(target, Ok(Some(_))));
        }
    }

    #[test]
    fn two_headings_or_no_region_leave_page_untouched() {
        let mut doc = HtmlParser.parse(&content_page(&[("h2", "One"), ("h3", "Two")]));
        let before = sp_html::to_html(&doc);
        assert_eq!(build_table_of_contents(&mut doc, &EnhanceConfig::default()), None);
        assert_eq!(sp_html::to_html(&doc), before);

        let mut bare = HtmlParser.parse("<main><h2>A</h2><h2>B</h2><h2>C</h2></main>");
        assert_eq!(build_table_of_contents(&mut bare, &EnhanceConfig::default()), None);
    }

    #[test]
    fn existing_ids_are_overwritten_and_outside_headings_ignored() {
        let mut doc = HtmlParser.parse(
            r#"<h2 id="top">Outside</h2><div class="content-body"><h2 id="custom">A</h2><h2>B</h2><h3>C</h3></div>"#,
        );
        let model = build_table_of_contents(&mut doc, &EnhanceConfig::default())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(model.entries[0].id, "heading-0");
        assert_eq!(model.entries[0].text, "A");
        assert!(matches!(doc.query_selector(doc.root(), "#custom"), Ok(None)));
        assert!(matches!(doc.query_selector(doc.root(), "#top"), Ok(Some(_))));
    }

    #[test]
    fn ids_are_positional_even_when_taken_outside_the_content_region() {
        let mut doc = HtmlParser.parse(
            r#"<p id="heading-0">Outside</p><div class="content-body"><h2>A</h2><h2>B</h2><h2>C</h2></div>"#,
        );
        let model = build_table_of_contents(&mut doc, &EnhanceConfig::default())
            .unwrap_or_else(|| unreachable!());
        assert_eq!(model.entries[0].id, "heading-0");

        let taken = doc
            .query_selector_all(doc.root(), "#heading-0")
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(taken.len(), 2);
        assert_eq!(doc.tag_name(taken[0]), Some("p"));
    }

    #[test]
    fn custom_title_is_text_not_markup() {
        let mut config = EnhanceConfig::default();
        config.toc.title = "<b>On this page</b>".to_owned();
        let mut doc = HtmlParser.parse(&content_page(&[("h2", "A"), ("h2", "B"), ("h2", "C")]));
        build_table_of_contents(&mut doc, &config).unwrap_or_else(|| unreachable!());

        let title = doc
            .query_selector(doc.root(), ".table-of-contents > h3")
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(doc.text_content(title), "<b>On this page</b>");
        assert!(matches!(doc.query_selector(doc.root(), ".table-of-contents b"), Ok(None)));
    }

    proptest! {
        #[test]
        fn ids_are_sequential_and_unique(levels in proptest::collection::vec(any::<bool>(), 3..24)) {
            let headings = levels
                .iter()
                .map(|is_h2| (if *is_h2 { "h2" } else { "h3" }, "Section"))
                .collect::<Vec<_>>();
            let mut doc = HtmlParser.parse(&content_page(&headings));
            let model = build_table_of_contents(&mut doc, &EnhanceConfig::default());
            prop_assert!(model.is_some());
            let model = model.unwrap_or_default();
            prop_assert_eq!(model.len(), levels.len());
            for (index, (entry, is_h2)) in model.entries.iter().zip(&levels).enumerate() {
                prop_assert_eq!(&entry.id, &heading_id(index));
                let expected = if *is_h2 { HeadingLevel::H2 } else { HeadingLevel::H3 };
                prop_assert_eq!(entry.level, expected);
            }
        }
    }
}
