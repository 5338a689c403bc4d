//! Mobile menu toggle and scroll-driven navbar visibility.

use crate::config::EnhanceConfig;
use crate::select_first;
use sp_dom::Document;
use sp_dom::NodeId;
use tracing::debug;

/// Last scroll offset seen by the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollTracker {
    last_offset: u32,
}

impl ScrollTracker {
    pub fn last_offset(&self) -> u32 {
        self.last_offset
    }

    /// Records `offset` and returns how far it moved from the previous one.
    pub fn record(&mut self, offset: u32) -> i64 {
        let delta = i64::from(offset) - i64::from(self.last_offset);
        self.last_offset = offset;
        delta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavbarVisibility {
    #[default]
    Shown,
    Hidden,
}

impl NavbarVisibility {
    /// Hidden only while moving down past `threshold`.
    pub fn for_scroll(delta: i64, offset: u32, threshold: u32) -> Self {
        if delta > 0 && offset > threshold {
            Self::Hidden
        } else {
            Self::Shown
        }
    }

    pub fn transform(self) -> &'static str {
        match self {
            Self::Shown => "translateY(0)",
            Self::Hidden => "translateY(-100%)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

/// Owns the menu and navbar state for one page view.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    tracker: ScrollTracker,
    visibility: NavbarVisibility,
    menu: MenuState,
    hide_threshold: u32,
    active_class: String,
    toggle: Option<NodeId>,
    menu_element: Option<NodeId>,
    navbar: Option<NodeId>,
}

impl NavigationController {
    pub fn attach(document: &Document, config: &EnhanceConfig) -> Self {
        let toggle = select_first(document, &config.selectors.nav_toggle);
        let menu_element = select_first(document, &config.selectors.nav_menu);
        let navbar = select_first(document, &config.selectors.navbar);
        if navbar.is_none() {
            debug!("no navbar on page; scroll state is tracked without styling");
        }
        Self {
            hide_threshold: config.navigation.hide_threshold,
            active_class: config.navigation.active_class.clone(),
            toggle,
            menu_element,
            navbar,
            ..Self::default()
        }
    }

    /// The toggle control, when both it and the menu exist.
    pub fn menu_toggle(&self) -> Option<NodeId> {
        self.menu_element.and(self.toggle)
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu
    }

    pub fn visibility(&self) -> NavbarVisibility {
        self.visibility
    }

    pub fn last_offset(&self) -> u32 {
        self.tracker.last_offset()
    }

    pub fn toggle_menu(&mut self, document: &mut Document) -> Option<MenuState> {
        let (Some(toggle), Some(menu)) = (self.toggle, self.menu_element) else {
            debug!("menu toggle or menu missing; ignoring toggle");
            return None;
        };
        document.toggle_class(menu, &self.active_class);
        document.toggle_class(toggle, &self.active_class);
        self.menu = self.menu.toggled();
        Some(self.menu)
    }

    pub fn on_scroll(&mut self, document: &mut Document, offset: u32) -> NavbarVisibility {
        let delta = self.tracker.record(offset);
        self.visibility = NavbarVisibility::for_scroll(delta, offset, self.hide_threshold);
        if let Some(navbar) = self.navbar {
            document.set_style_property(navbar, "transform", self.visibility.transform());
        }
        self.visibility
    }
}
