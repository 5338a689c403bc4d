//! Content augmentation: anchor scrolling, code-copy buttons and external-link markers.

mod anchor;
mod copy;
mod links;

pub use anchor::AnchorOutcome;
pub use anchor::follow_anchor;
pub use copy::CopyButton;
pub use copy::CopyLabel;
pub use copy::install_copy_buttons;
pub use links::decorate_external_links;
pub use links::is_external;
