//! Progressive enhancement for documentation pages.
//!
//! Each behavior is a standalone unit over a [`Document`] and an [`EnhanceConfig`];
//! [`Page`] wires them together in page-ready order and routes host events to them.

pub mod augment;
mod config;
mod lazy;
mod nav;
mod observe;
mod page;
mod reveal;
mod theme;
mod toc;

use sp_dom::Document;
use sp_dom::NodeId;
use tracing::warn;

pub use config::CopyConfig;
pub use config::EnhanceConfig;
pub use config::ExternalLinkConfig;
pub use config::ExternalLinkPolicy;
pub use config::NavigationConfig;
pub use config::RevealConfig;
pub use config::SelectorConfig;
pub use config::TocConfig;
pub use lazy::LazyImageLoader;
pub use nav::MenuState;
pub use nav::NavbarVisibility;
pub use nav::NavigationController;
pub use nav::ScrollTracker;
pub use observe::ObservationState;
pub use page::ClickOutcome;
pub use page::ObserverKind;
pub use page::Page;
pub use page::PageTask;
pub use page::ReadySummary;
pub use reveal::RevealEngine;
pub use theme::Theme;
pub use theme::ThemeSynchronizer;
pub use theme::apply_theme;
pub use toc::HeadingLevel;
pub use toc::TocEntry;
pub use toc::TocModel;
pub use toc::build_table_of_contents;
pub use toc::heading_id;

pub(crate) fn select_first(document: &Document, selector: &str) -> Option<NodeId> {
    document
        .query_selector(document.root(), selector)
        .unwrap_or_else(|error| {
            warn!(selector, %error, "ignoring unusable selector");
            None
        })
}

pub(crate) fn select_all(document: &Document, selector: &str) -> Vec<NodeId> {
    select_all_in(document, document.root(), selector)
}

pub(crate) fn select_all_in(document: &Document, scope: NodeId, selector: &str) -> Vec<NodeId> {
    document
        .query_selector_all(scope, selector)
        .unwrap_or_else(|error| {
            warn!(selector, %error, "ignoring unusable selector");
            Vec::new()
        })
}
