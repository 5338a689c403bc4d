//! Viewport, element boxes and scroll requests.

use sp_dom::NodeId;
use std::collections::HashMap;
use tracing::debug;

/// Axis-aligned box in document coordinates (CSS pixels).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Overlap of two boxes. Edge-adjacent boxes produce a zero-area overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Element boxes produced by whoever laid the page out.
#[derive(Debug, Clone, Default)]
pub struct LayoutBoxes {
    boxes: HashMap<NodeId, Rect>,
}

impl LayoutBoxes {
    pub fn set(&mut self, node: NodeId, rect: Rect) {
        self.boxes.insert(node, rect);
    }

    pub fn get(&self, node: NodeId) -> Option<Rect> {
        self.boxes.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

/// A `scrollIntoView` call recorded by the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: NodeId,
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// The visible window onto the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    scroll_y: u32,
    requests: Vec<ScrollRequest>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 800)
    }
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0,
            requests: Vec::new(),
        }
    }

    pub fn scroll_y(&self) -> u32 {
        self.scroll_y
    }

    pub fn set_scroll_y(&mut self, offset: u32) {
        self.scroll_y = offset;
    }

    /// Visible region in document coordinates.
    pub fn visible_rect(&self) -> Rect {
        Rect::new(
            0.0,
            f64::from(self.scroll_y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }

    /// Records a scroll request and returns the offset it settles on, if the
    /// target's box is known.
    pub fn scroll_into_view(&mut self, request: ScrollRequest, layout: &LayoutBoxes) -> Option<u32> {
        self.requests.push(request);
        let Some(rect) = layout.get(request.target) else {
            debug!(target_node = request.target.index(), "scroll target has no layout box");
            return None;
        };

        let height = f64::from(self.height);
        let top = match request.block {
            ScrollBlock::Start => rect.y,
            ScrollBlock::Center => rect.y + rect.height / 2.0 - height / 2.0,
            ScrollBlock::End => rect.bottom() - height,
            ScrollBlock::Nearest => {
                let visible = self.visible_rect();
                if rect.y >= visible.y && rect.bottom() <= visible.bottom() {
                    visible.y
                } else if rect.y < visible.y {
                    rect.y
                } else {
                    rect.bottom() - height
                }
            }
        };
        Some(top.max(0.0).round() as u32)
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.requests
    }
}

#[cfg(test)]
mod tests {
    use super::LayoutBoxes;
    use super::Rect;
    use super::ScrollBehavior;
    use super::ScrollBlock;
    use super::ScrollRequest;
    use super::Viewport;
    use sp_dom::Document;

    #[test]
    fn intersection_of_overlapping_and_disjoint_boxes() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        let touching = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection(&touching).map(|r| r.area()), Some(0.0));

        let far = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert_eq!(a.intersection(&far), None);
    }

    #[test]
    fn scroll_into_view_aligns_block_start() {
        let mut doc = Document::empty();
        let target = doc.create_element("h2");
        let mut layout = LayoutBoxes::default();
        layout.set(target, Rect::new(0.0, 1500.0, 800.0, 40.0));

        let mut viewport = Viewport::new(1024, 700);
        let request = ScrollRequest {
            target,
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Start,
        };
        assert_eq!(viewport.scroll_into_view(request, &layout), Some(1500));
        assert_eq!(viewport.scroll_requests(), &[request]);
        assert_eq!(viewport.scroll_y(), 0);
    }

    #[test]
    fn unknown_boxes_record_the_request_only() {
        let mut doc = Document::empty();
        let target = doc.create_element("h2");
        let mut viewport = Viewport::default();
        let settled = viewport.scroll_into_view(
            ScrollRequest {
                target,
                behavior: ScrollBehavior::Smooth,
                block: ScrollBlock::Start,
            },
            &LayoutBoxes::default(),
        );
        assert_eq!(settled, None);
        assert_eq!(viewport.scroll_requests().len(), 1);
    }
}
