//! Viewport-intersection observation.
//!
//! Each observer tracks a set of targets and, when asked for records, reports every
//! target whose intersecting state changed since the last report. The first report
//! after `observe` is always delivered, matching the platform behaviour of an
//! initial callback per target.

use crate::geometry::LayoutBoxes;
use crate::geometry::Rect;
use crate::geometry::Viewport;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_dom::NodeId;

/// Margins added to (positive) or removed from (negative) the root box, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    /// Parses the one-to-four value CSS shorthand, e.g. `0px 0px -50px 0px`.
    pub fn parse(input: &str) -> SprinkleResult<Self> {
        let values = input
            .split_ascii_whitespace()
            .map(parse_px)
            .collect::<SprinkleResult<Vec<_>>>()?;

        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => {
                return Err(SprinkleError::new(
                    "host.intersection.root_margin",
                    format!("root margin `{input}` must have one to four values"),
                ));
            }
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    fn apply(&self, rect: Rect) -> Rect {
        Rect::new(
            rect.x - self.left,
            rect.y - self.top,
            rect.width + self.left + self.right,
            rect.height + self.top + self.bottom,
        )
    }
}

fn parse_px(token: &str) -> SprinkleResult<f64> {
    let number = token.strip_suffix("px").unwrap_or(token);
    let parsed = number.parse::<f64>().map_err(|_| {
        SprinkleError::new(
            "host.intersection.root_margin",
            format!("`{token}` is not a pixel length"),
        )
    })?;
    if token != "0" && !token.ends_with("px") {
        return Err(SprinkleError::new(
            "host.intersection.root_margin",
            format!("`{token}` must use px units"),
        ));
    }
    Ok(parsed)
}

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Fraction of the target that must be visible, `0.0..=1.0`.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            root_margin: RootMargin::default(),
        }
    }
}

/// One notification about one target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    pub ratio: f64,
}

#[derive(Debug, Clone)]
struct ObservedTarget {
    node: NodeId,
    last_reported: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct IntersectionObserver {
    options: ObserverOptions,
    targets: Vec<ObservedTarget>,
}

impl IntersectionObserver {
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            targets: Vec::new(),
        }
    }

    pub fn options(&self) -> ObserverOptions {
        self.options
    }

    /// Starts observing `node`; observing twice is a no-op.
    pub fn observe(&mut self, node: NodeId) {
        if self.is_observing(node) {
            return;
        }
        self.targets.push(ObservedTarget {
            node,
            last_reported: None,
        });
    }

    pub fn unobserve(&mut self, node: NodeId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|target| target.node != node);
        self.targets.len() != before
    }

    pub fn is_observing(&self, node: NodeId) -> bool {
        self.targets.iter().any(|target| target.node == node)
    }

    pub fn observed(&self) -> Vec<NodeId> {
        self.targets.iter().map(|target| target.node).collect()
    }

    /// Computes entries for targets whose intersecting state changed.
    pub fn take_records(&mut self, layout: &LayoutBoxes, viewport: &Viewport) -> Vec<IntersectionEntry> {
        let root = self.options.root_margin.apply(viewport.visible_rect());
        let threshold = self.options.threshold;
        let mut entries = Vec::new();

        for target in &mut self.targets {
            let (is_intersecting, ratio) = match layout.get(target.node) {
                Some(rect) => evaluate(&rect, &root, threshold),
                None => (false, 0.0),
            };
            if target.last_reported == Some(is_intersecting) {
                continue;
            }
            target.last_reported = Some(is_intersecting);
            entries.push(IntersectionEntry {
                target: target.node,
                is_intersecting,
                ratio,
            });
        }

        entries
    }
}

fn evaluate(target: &Rect, root: &Rect, threshold: f64) -> (bool, f64) {
    let Some(overlap) = target.intersection(root) else {
        return (false, 0.0);
    };
    let area = target.area();
    let ratio = if area > 0.0 {
        (overlap.area() / area).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let intersecting = if threshold > 0.0 {
        ratio >= threshold
    } else {
        true
    };
    (intersecting, ratio)
}
