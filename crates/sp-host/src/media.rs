//! System color-scheme preference signal.

const PREFERS_DARK_QUERY: &str = "(prefers-color-scheme: dark)";

/// Live `(prefers-color-scheme: dark)` match state plus its change subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSchemeSignal {
    matches: bool,
    subscribers: usize,
}

impl ColorSchemeSignal {
    pub fn new(prefers_dark: bool) -> Self {
        Self {
            matches: prefers_dark,
            subscribers: 0,
        }
    }

    /// Media query the signal answers.
    pub fn query(&self) -> &'static str {
        PREFERS_DARK_QUERY
    }

    pub fn matches(&self) -> bool {
        self.matches
    }

    /// Registers interest in change notifications for the rest of the page view.
    pub fn subscribe(&mut self) {
        self.subscribers = self.subscribers.saturating_add(1);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
    }

    /// Updates the preference. Returns true when subscribers must be notified.
    pub fn set(&mut self, prefers_dark: bool) -> bool {
        if self.matches == prefers_dark {
            return false;
        }
        self.matches = prefers_dark;
        self.subscribers > 0
    }
}
