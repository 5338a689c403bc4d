//! Fire-once intersection tracking shared by the reveal engine and the lazy loader.

use sp_dom::NodeId;
use sp_host::IntersectionEntry;
use sp_host::IntersectionObserver;
use sp_host::LayoutBoxes;
use sp_host::Viewport;
use std::collections::BTreeMap;

/// Per-element observation progress. `Pending` moves to `Revealed` at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationState {
    Pending,
    Revealed,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FireOnce {
    observer: Option<IntersectionObserver>,
    states: BTreeMap<NodeId, ObservationState>,
}

impl FireOnce {
    pub(crate) fn new(observer: IntersectionObserver) -> Self {
        Self {
            observer: Some(observer),
            states: BTreeMap::new(),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.observer.is_some()
    }

    pub(crate) fn observe(&mut self, node: NodeId) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        observer.observe(node);
        self.states.entry(node).or_insert(ObservationState::Pending);
    }

    pub(crate) fn state(&self, node: NodeId) -> Option<ObservationState> {
        self.states.get(&node).copied()
    }

    pub(crate) fn observing(&self) -> usize {
        self.observer
            .as_ref()
            .map_or(0, |observer| observer.observed().len())
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    /// Records from the underlying observer against current geometry.
    pub(crate) fn take_records(&mut self, layout: &LayoutBoxes, viewport: &Viewport) -> Vec<IntersectionEntry> {
        self.observer
            .as_mut()
            .map(|observer| observer.take_records(layout, viewport))
            .unwrap_or_default()
    }

    /// Marks pending targets of intersecting entries as fired and releases them.
    /// Returns the targets that fired now, in entry order.
    pub(crate) fn fire(&mut self, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        let mut fired = Vec::new();
        for entry in entries.iter().filter(|entry| entry.is_intersecting) {
            let Some(state) = self.states.get_mut(&entry.target) else {
                continue;
            };
            if *state == ObservationState::Revealed {
                continue;
            }
            *state = ObservationState::Revealed;
            if let Some(observer) = self.observer.as_mut() {
                observer.unobserve(entry.target);
            }
            fired.push(entry.target);
        }
        fired
    }
}
