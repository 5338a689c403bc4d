//! Smooth scrolling for in-page anchor links.

use sp_dom::Document;
use sp_dom::NodeId;
use sp_host::LayoutBoxes;
use sp_host::ScrollBehavior;
use sp_host::ScrollBlock;
use sp_host::ScrollRequest;
use sp_host::Viewport;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// A smooth scroll was requested; `offset` is where it settles when the target has a box.
    Scrolled { target: NodeId, offset: Option<u32> },
    /// The fragment named nothing on the page, or was not a usable selector.
    NoTarget,
}

/// Resolves the link's `href` as a selector and requests a smooth scroll to the match.
pub fn follow_anchor(
    document: &Document,
    link: NodeId,
    viewport: &mut Viewport,
    layout: &LayoutBoxes,
) -> AnchorOutcome {
    let Some(href) = document.attribute(link, "href") else {
        return AnchorOutcome::NoTarget;
    };
    let target = match document.query_selector(document.root(), href) {
        Ok(Some(target)) => target,
        Ok(None) => {
            debug!(href, "anchor target not found");
            return AnchorOutcome::NoTarget;
        }
        Err(error) => {
            debug!(href, %error, "anchor fragment is not a selector");
            return AnchorOutcome::NoTarget;
        }
    };

    let offset = viewport.scroll_into_view(
        ScrollRequest {
            target,
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Start,
        },
        layout,
    );
    AnchorOutcome::Scrolled { target, offset }
}

#[cfg(test)]
mod tests {
    use super::AnchorOutcome;
    use super::follow_anchor;
    use sp_host::LayoutBoxes;
    use sp_host::Rect;
    use sp_host::ScrollBehavior;
    use sp_host::Viewport;
    use sp_html::HtmlParser;

    const PAGE: &str = r##"<main><a id="go" href="#install">Install</a><a id="bare" href="#">Top</a><a id="lost" href="#missing">Lost</a><h2 id="install">Install</h2></main>"##;

    fn link(doc: &sp_dom::Document, id: &str) -> sp_dom::NodeId {
        doc.query_selector(doc.root(), &format!("#{id}"))
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!())
    }

    #[test]
    fn scrolls_smoothly_to_matching_target() {
        let doc = HtmlParser.parse(PAGE);
        let heading = doc
            .query_selector(doc.root(), "h2")
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        let mut layout = LayoutBoxes::default();
        layout.set(heading, Rect::new(0.0, 900.0, 800.0, 40.0));
        let mut viewport = Viewport::default();

        let outcome = follow_anchor(&doc, link(&doc, "go"), &mut viewport, &layout);
        assert_eq!(
            outcome,
            AnchorOutcome::Scrolled {
                target: heading,
                offset: Some(900)
            }
        );
        assert_eq!(viewport.scroll_requests()[0].behavior, ScrollBehavior::Smooth);
    }

    #[test]
    fn bare_and_unmatched_fragments_are_silent() {
        let doc = HtmlParser.parse(PAGE);
        let mut viewport = Viewport::default();
        viewport.set_scroll_y(320);
        let layout = LayoutBoxes::default();

        for id in ["bare", "lost"] {
            let outcome = follow_anchor(&doc, link(&doc, id), &mut viewport, &layout);
            assert_eq!(outcome, AnchorOutcome::NoTarget);
        }
        assert!(viewport.scroll_requests().is_empty());
        assert_eq!(viewport.scroll_y(), 320);
    }
}
