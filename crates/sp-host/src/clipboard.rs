//! System clipboard access.

use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use std::fmt::Debug;

/// Write access to the system clipboard. The page settles each write on a later
/// turn of its task queue, so implementations may complete synchronously.
pub trait Clipboard: Debug {
    fn write_text(&mut self, text: &str) -> SprinkleResult<()>;
}

/// In-memory clipboard used by tests and the replay harness.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryClipboard {
    contents: Option<String>,
    writes: usize,
    deny_writes: bool,
}

impl MemoryClipboard {
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Makes every following write fail, as when the page lacks clipboard permission.
    pub fn set_deny_writes(&mut self, deny: bool) {
        self.deny_writes = deny;
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> SprinkleResult<()> {
        if self.deny_writes {
            return Err(SprinkleError::new(
                "host.clipboard.denied",
                "clipboard write permission denied",
            ));
        }
        self.contents = Some(text.to_owned());
        self.writes = self.writes.saturating_add(1);
        Ok(())
    }
}
