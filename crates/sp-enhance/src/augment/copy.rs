//! Copy-to-clipboard buttons for code blocks.

use crate::config::CopyConfig;
use crate::config::EnhanceConfig;
use crate::select_all;
use sp_dom::Document;
use sp_dom::NodeId;
use sp_host::TimerId;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyLabel {
    #[default]
    Idle,
    Confirmed,
}

/// One installed button and the code block it copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyButton {
    pub button: NodeId,
    pub code: NodeId,
    pub wrapper: NodeId,
    label: CopyLabel,
    revert: Option<TimerId>,
}

impl CopyButton {
    pub fn label(&self) -> CopyLabel {
        self.label
    }

    pub fn pending_revert(&self) -> Option<TimerId> {
        self.revert
    }

    /// Text handed to the clipboard: the block's current text content.
    pub fn code_text(&self, document: &Document) -> String {
        document.text_content(self.code)
    }

    /// Shows the confirmation label and remembers the revert timer, returning the
    /// timer it replaces so the caller can cancel it.
    pub fn confirm(&mut self, document: &mut Document, config: &CopyConfig, revert: TimerId) -> Option<TimerId> {
        document.set_text_content(self.button, &config.confirmed_label);
        self.label = CopyLabel::Confirmed;
        self.revert.replace(revert)
    }

    pub fn revert(&mut self, document: &mut Document, config: &CopyConfig) {
        document.set_text_content(self.button, &config.idle_label);
        self.label = CopyLabel::Idle;
        self.revert = None;
    }
}

/// Wraps every code block in a wrapper holding the block and a copy button.
pub fn install_copy_buttons(document: &mut Document, config: &EnhanceConfig) -> Vec<CopyButton> {
    let copy = &config.copy;
    let mut buttons = Vec::new();

    for code in select_all(document, &config.selectors.code_block) {
        let Some(parent) = document.parent(code) else {
            continue;
        };
        let button = document.create_element_with_attrs(
            "button",
            vec![("class".to_owned(), copy.button_class.clone())],
        );
        document.set_text_content(button, &copy.idle_label);
        let wrapper = document.create_element_with_attrs(
            "div",
            vec![("class".to_owned(), copy.wrapper_class.clone())],
        );

        let placed = document
            .insert_before(parent, wrapper, Some(code))
            .and_then(|()| document.append_child(wrapper, code))
            .and_then(|()| document.append_child(wrapper, button));
        if let Err(error) = placed {
            debug!(%error, "skipping code block that could not be wrapped");
            continue;
        }

        buttons.push(CopyButton {
            button,
            code,
            wrapper,
            label: CopyLabel::Idle,
            revert: None,
        });
    }

    buttons
}

#[cfg(test)]
mod tests {
    use super::CopyLabel;
    use super::install_copy_buttons;
    use crate::config::EnhanceConfig;
    use sp_host::TimerQueue;
    use sp_html::HtmlParser;
    use sp_html::inner_html;

    #[test]
    fn wraps_each_code_block_with_a_button() {
        let mut doc = HtmlParser.parse("<pre><code>cargo build</code></pre><pre><code>cargo test</code></pre>");
        let buttons = install_copy_buttons(&mut doc, &EnhanceConfig::default());
        assert_eq!(buttons.len(), 2);

        let first_pre = doc.first_child(doc.root()).unwrap_or_else(|| unreachable!());
        assert_eq!(
            inner_html(&doc, first_pre),
            r#"<div class="code-wrapper"><code>cargo build</code><button class="copy-button">Copy</button></div>"#
        );
        assert_eq!(buttons[1].code_text(&doc), "cargo test");
        assert_eq!(doc.parent(buttons[1].button), Some(buttons[1].wrapper));
    }

    #[test]
    fn confirm_replaces_pending_revert() {
        let mut doc = HtmlParser.parse("<pre><code>ls</code></pre>");
        let config = EnhanceConfig::default();
        let mut buttons = install_copy_buttons(&mut doc, &config);
        let mut timers = TimerQueue::default();
        let first = timers.schedule(2000, ());
        let second = timers.schedule(2000, ());

        let button = &mut buttons[0];
        assert_eq!(button.confirm(&mut doc, &config.copy, first), None);
        assert_eq!(button.confirm(&mut doc, &config.copy, second), Some(first));
        assert_eq!(button.label(), CopyLabel::Confirmed);
        assert_eq!(doc.text_content(button.button), "Copied!");

        button.revert(&mut doc, &config.copy);
        assert_eq!(button.label(), CopyLabel::Idle);
        assert_eq!(button.pending_revert(), None);
        assert_eq!(doc.text_content(button.button), "Copy");
    }
}
