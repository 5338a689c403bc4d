//! Deferred image loading.

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

const LAZY_CLASS: &str = "lazy";

#[derive(Debug, Clone, Default)]
pub struct LazyImageLoader {
    images: FireOnce,
}

impl LazyImageLoader {
    pub fn attach(document: &Document, config: &EnhanceConfig, observer: Option<IntersectionObserver>) -> Self {
        let Some(observer) = observer else {
            debug!("intersection observer unavailable; lazy images left as authored");
            return Self::default();
        };
        let mut images = FireOnce::new(observer);
        for image in select_all(document, &config.selectors.lazy_image) {
            images.observe(image);
        }
        Self { images }
    }

    pub fn is_active(&self) -> bool {
        self.images.is_active()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn state(&self, image: NodeId) -> Option<ObservationState> {
        self.images.state(image)
    }

    /// Loads images reported as intersecting. Returns the images loaded now.
    pub fn handle(&mut self, document: &mut Document, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        let loaded = self.images.fire(entries);
        for image in &loaded {
            load_image(document, *image);
        }
        loaded
    }

    pub fn poll(&mut self, document: &mut Document, layout: &LayoutBoxes, viewport: &Viewport) -> Vec<NodeId> {
        let entries = self.images.take_records(layout, viewport);
        self.handle(document, &entries)
    }
}

/// Swaps in `data-src` when it carries a value; an existing `src` is kept otherwise.
fn load_image(document: &mut Document, image: NodeId) {
    let deferred = document
        .attribute(image, "data-src")
        .filter(|source| !source.is_empty())
        .map(str::to_owned);
    match deferred {
        Some(source) => document.set_attribute(image, "src", &source),
        None => debug!(image = image.index(), "lazy image has no data-src"),
    }
    document.remove_class(image, LAZY_CLASS);
}
