//! Host environment capabilities consumed by the page enhancer.
//!
//! This is the boundary the enhancer sees in place of a live browser: the page
//! location, the viewport and element boxes, intersection observers, the
//! color-scheme preference signal, the clipboard and a virtual-clock task queue.

mod clipboard;
mod geometry;
mod intersection;
mod location;
mod media;
mod timer;

use sp_core::SprinkleResult;

pub use clipboard::Clipboard;
pub use clipboard::MemoryClipboard;
pub use geometry::LayoutBoxes;
pub use geometry::Rect;
pub use geometry::ScrollBehavior;
pub use geometry::ScrollBlock;
pub use geometry::ScrollRequest;
pub use geometry::Viewport;
pub use intersection::IntersectionEntry;
pub use intersection::IntersectionObserver;
pub use intersection::ObserverOptions;
pub use intersection::RootMargin;
pub use location::PageLocation;
pub use media::ColorSchemeSignal;
pub use timer::TimerId;
pub use timer::TimerQueue;

/// Which optional platform features the environment provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub clipboard: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            clipboard: true,
        }
    }
}

/// Everything the environment provides to one page view.
#[derive(Debug)]
pub struct Host<C: Clipboard = MemoryClipboard> {
    pub location: PageLocation,
    pub viewport: Viewport,
    pub layout: LayoutBoxes,
    pub color_scheme: ColorSchemeSignal,
    pub capabilities: Capabilities,
    clipboard: C,
}

impl Host<MemoryClipboard> {
    pub fn new(location: PageLocation) -> Self {
        Self::new_with_clipboard(location, MemoryClipboard::default())
    }

    pub fn for_url(url: &str) -> SprinkleResult<Self> {
        Ok(Self::new(PageLocation::parse(url)?))
    }
}

impl<C: Clipboard> Host<C> {
    pub fn new_with_clipboard(location: PageLocation, clipboard: C) -> Self {
        Self {
            location,
            viewport: Viewport::default(),
            layout: LayoutBoxes::default(),
            color_scheme: ColorSchemeSignal::default(),
            capabilities: Capabilities::default(),
            clipboard,
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_prefers_dark(mut self, prefers_dark: bool) -> Self {
        self.color_scheme = ColorSchemeSignal::new(prefers_dark);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// Creates an observer, or `None` when the environment has no intersection support.
    pub fn intersection_observer(&self, options: ObserverOptions) -> Option<IntersectionObserver> {
        self.capabilities
            .intersection_observer
            .then(|| IntersectionObserver::new(options))
    }
}
