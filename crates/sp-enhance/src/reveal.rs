//! Fade-in of designated elements when they first scroll into view.

use crate::config::EnhanceConfig;
use crate::observe::FireOnce;
use crate::observe::ObservationState;
use crate::select_all;
use sp_dom::Document;
use sp_dom::NodeId;
use sp_host::IntersectionEntry;
use sp_host::IntersectionObserver;
use sp_host::LayoutBoxes;
use sp_host::Viewport;
use tracing::debug;

const HIDDEN_OPACITY: &str = "0";
const HIDDEN_TRANSFORM: &str = "translateY(20px)";
const TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";
const SHOWN_OPACITY: &str = "1";
const SHOWN_TRANSFORM: &str = "translateY(0)";

#[derive(Debug, Clone, Default)]
pub struct RevealEngine {
    targets: FireOnce,
}

impl RevealEngine {
    /// Hides every reveal target and starts observing it. Without an observer the
    /// targets keep their original styling so they never stay invisible.
    pub fn attach(
        document: &mut Document,
        config: &EnhanceConfig,
        observer: Option<IntersectionObserver>,
    ) -> Self {
        let Some(observer) = observer else {
            debug!("intersection observer unavailable; reveal targets left visible");
            return Self::default();
        };

        let mut targets = FireOnce::new(observer);
        for node in select_all(document, &config.selectors.reveal) {
            document.set_style_property(node, "opacity", HIDDEN_OPACITY);
            document.set_style_property(node, "transform", HIDDEN_TRANSFORM);
            document.set_style_property(node, "transition", TRANSITION);
            targets.observe(node);
        }
        Self { targets }
    }

    pub fn is_active(&self) -> bool {
        self.targets.is_active()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    pub fn observing(&self) -> usize {
        self.targets.observing()
    }

    pub fn state(&self, node: NodeId) -> Option<ObservationState> {
        self.targets.state(node)
    }

    /// Reveals targets reported as intersecting. Returns the newly revealed nodes.
    pub fn handle(&mut self, document: &mut Document, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        let revealed = self.targets.fire(entries);
        for node in &revealed {
            document.set_style_property(*node, "opacity", SHOWN_OPACITY);
            document.set_style_property(*node, "transform", SHOWN_TRANSFORM);
        }
        revealed
    }

    pub fn poll(&mut self, document: &mut Document, layout: &LayoutBoxes, viewport: &Viewport) -> Vec<NodeId> {
        let entries = self.targets.take_records(layout, viewport);
        self.handle(document, &entries)
    }
}

#[cfg(test)]
mod tests {
    use super::RevealEngine;
    use crate::config::EnhanceConfig;
    use crate::observe::ObservationState;
    use sp_host::IntersectionObserver;
    use sp_host::LayoutBoxes;
    use sp_host::Rect;
    use sp_host::Viewport;
    use sp_html::HtmlParser;

    const CARDS: &str = r#"<section><div class="feature-card">A</div><div class="tech-item">B</div><p>plain</p></section>"#;

    fn observer() -> Option<IntersectionObserver> {
        EnhanceConfig::default()
            .reveal
            .observer_options()
            .ok()
            .map(IntersectionObserver::new)
    }

    #[test]
    fn hides_targets_then_reveals_once_in_view() {
        let mut doc = HtmlParser.parse(CARDS);
        let cards = doc
            .query_selector_all(doc.root(), ".feature-card, .tech-item")
            .unwrap_or_default();
        let mut engine = RevealEngine::attach(&mut doc, &EnhanceConfig::default(), observer());
        assert_eq!(engine.target_count(), 2);
        assert_eq!(doc.style_property(cards[0], "opacity").as_deref(), Some("0"));
        assert_eq!(
            doc.style_property(cards[1], "transition").as_deref(),
            Some("opacity 0.6s ease, transform 0.6s ease")
        );

        let mut layout = LayoutBoxes::default();
        layout.set(cards[0], Rect::new(0.0, 100.0, 300.0, 200.0));
        layout.set(cards[1], Rect::new(0.0, 2000.0, 300.0, 200.0));
        let mut viewport = Viewport::new(1024, 800);

        assert_eq!(engine.poll(&mut doc, &layout, &viewport), vec![cards[0]]);
        assert_eq!(doc.style_property(cards[0], "opacity").as_deref(), Some("1"));
        assert_eq!(
            doc.style_property(cards[0], "transform").as_deref(),
            Some("translateY(0)")
        );
        assert_eq!(engine.state(cards[1]), Some(ObservationState::Pending));
        assert_eq!(engine.observing(), 1);

        viewport.set_scroll_y(1500);
        assert_eq!(engine.poll(&mut doc, &layout, &viewport), vec![cards[1]]);
        viewport.set_scroll_y(0);
        assert!(engine.poll(&mut doc, &layout, &viewport).is_empty());
        assert_eq!(doc.style_property(cards[0], "opacity").as_deref(), Some("1"));
        assert_eq!(engine.observing(), 0);
    }

    #[test]
    fn leaves_targets_visible_without_observer() {
        let mut doc = HtmlParser.parse(CARDS);
        let engine = RevealEngine::attach(&mut doc, &EnhanceConfig::default(), None);
        assert!(!engine.is_active());
        let card = doc
            .query_selector(doc.root(), ".feature-card")
            .ok()
            .flatten()
            .unwrap_or_else(|| unreachable!());
        assert_eq!(doc.style_property(card, "opacity"), None);
        assert_eq!(doc.attribute(card, "style"), None);
    }
}
