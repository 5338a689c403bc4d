//! One enhanced page view: runs every behavior on page-ready and routes host events.

use crate::augment::AnchorOutcome;
use crate::augment::CopyButton;
use crate::augment::decorate_external_links;
use crate::augment::follow_anchor;
use crate::augment::install_copy_buttons;
use crate::config::EnhanceConfig;
use crate::lazy::LazyImageLoader;
use crate::nav::NavbarVisibility;
use crate::nav::NavigationController;
use crate::reveal::RevealEngine;
use crate::select_all;
use crate::theme::Theme;
use crate::theme::ThemeSynchronizer;
use crate::toc::TocModel;
use crate::toc::build_table_of_contents;
use sp_core::Millis;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_dom::Document;
use sp_dom::NodeId;
use sp_host::Clipboard;
use sp_host::Host;
use sp_host::IntersectionEntry;
use sp_host::MemoryClipboard;
use sp_host::ObserverOptions;
use sp_host::TimerQueue;
use std::collections::BTreeMap;
use std::iter;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Work queued on the page's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTask {
    ClipboardSettled {
        button: usize,
        result: SprinkleResult<()>,
    },
    RevertLabel {
        button: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickAction {
    ToggleMenu,
    FollowAnchor,
    Copy(usize),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickOutcome {
    /// At least one listener ran.
    pub handled: bool,
    pub default_prevented: bool,
}

/// Which observer an injected batch of entries belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverKind {
    Reveal,
    LazyImages,
}

/// What page-ready set up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadySummary {
    pub menu_toggle: bool,
    pub anchor_links: usize,
    pub reveal_targets: usize,
    pub copy_buttons: usize,
    pub external_links: usize,
    pub toc_entries: usize,
    pub theme: Theme,
    pub lazy_images: usize,
}

#[derive(Debug)]
pub struct Page<C: Clipboard = MemoryClipboard> {
    document: Document,
    host: Host<C>,
    config: EnhanceConfig,
    timers: TimerQueue<PageTask>,
    listeners: BTreeMap<NodeId, Vec<ClickAction>>,
    scroll_listening: bool,
    navigation: NavigationController,
    reveal: RevealEngine,
    copy_buttons: Vec<CopyButton>,
    external_links: Vec<NodeId>,
    toc: Option<TocModel>,
    theme: Option<ThemeSynchronizer>,
    lazy_images: LazyImageLoader,
    summary: Option<ReadySummary>,
}

impl<C: Clipboard> Page<C> {
    pub fn new(document: Document, host: Host<C>, config: EnhanceConfig) -> SprinkleResult<Self> {
        config.validate()?;
        Ok(Self {
            document,
            host,
            config,
            timers: TimerQueue::default(),
            listeners: BTreeMap::new(),
            scroll_listening: false,
            navigation: NavigationController::default(),
            reveal: RevealEngine::default(),
            copy_buttons: Vec::new(),
            external_links: Vec::new(),
            toc: None,
            theme: None,
            lazy_images: LazyImageLoader::default(),
            summary: None,
        })
    }

    /// Runs every enhancement once. Later calls return the first summary unchanged.
    pub fn ready(&mut self) -> ReadySummary {
        if let Some(summary) = self.summary {
            debug!("page already enhanced; ignoring repeated ready");
            return summary;
        }

        self.navigation = NavigationController::attach(&self.document, &self.config);
        if let Some(toggle) = self.navigation.menu_toggle() {
            self.listen(toggle, ClickAction::ToggleMenu);
        }

        let anchors = select_all(&self.document, &self.config.selectors.anchor_link);
        for anchor in &anchors {
            self.listen(*anchor, ClickAction::FollowAnchor);
        }

        self.scroll_listening = true;

        let reveal_observer = self
            .config
            .reveal
            .observer_options()
            .ok()
            .and_then(|options| self.host.intersection_observer(options));
        self.reveal = RevealEngine::attach(&mut self.document, &self.config, reveal_observer);

        self.copy_buttons = install_copy_buttons(&mut self.document, &self.config);
        let copy_targets = self
            .copy_buttons
            .iter()
            .map(|button| button.button)
            .collect::<Vec<_>>();
        for (index, button) in copy_targets.into_iter().enumerate() {
            self.listen(button, ClickAction::Copy(index));
        }

        self.external_links =
            decorate_external_links(&mut self.document, &self.config, &self.host.location);
        self.toc = build_table_of_contents(&mut self.document, &self.config);

        let theme = ThemeSynchronizer::attach(&mut self.document, &mut self.host.color_scheme);
        self.theme = Some(theme);

        let lazy_observer = self.host.intersection_observer(ObserverOptions::default());
        self.lazy_images = LazyImageLoader::attach(&self.document, &self.config, lazy_observer);

        let summary = ReadySummary {
            menu_toggle: self.navigation.menu_toggle().is_some(),
            anchor_links: anchors.len(),
            reveal_targets: self.reveal.target_count(),
            copy_buttons: self.copy_buttons.len(),
            external_links: self.external_links.len(),
            toc_entries: self.toc.as_ref().map_or(0, TocModel::len),
            theme: theme.current(),
            lazy_images: self.lazy_images.image_count(),
        };
        self.summary = Some(summary);
        info!(
            url = self.host.location.href(),
            anchors = summary.anchor_links,
            reveal = summary.reveal_targets,
            copy_buttons = summary.copy_buttons,
            external_links = summary.external_links,
            toc_entries = summary.toc_entries,
            theme = summary.theme.as_str(),
            lazy_images = summary.lazy_images,
            "page enhanced"
        );

        self.refresh_intersections();
        summary
    }

    fn listen(&mut self, node: NodeId, action: ClickAction) {
        self.listeners.entry(node).or_default().push(action);
    }

    /// Dispatches a click on `target`, bubbling through its ancestors.
    pub fn click(&mut self, target: NodeId) -> ClickOutcome {
        let mut outcome = ClickOutcome::default();
        if !self.document.contains_node(target) {
            debug!(node = target.index(), "click on unknown node");
            return outcome;
        }

        let path = iter::once(target)
            .chain(self.document.ancestors(target))
            .collect::<Vec<_>>();
        for current in path {
            let actions = self.listeners.get(&current).cloned().unwrap_or_default();
            for action in actions {
                outcome.handled = true;
                match action {
                    ClickAction::ToggleMenu => {
                        self.navigation.toggle_menu(&mut self.document);
                    }
                    ClickAction::FollowAnchor => {
                        outcome.default_prevented = true;
                        self.follow_anchor(current);
                    }
                    ClickAction::Copy(index) => self.copy_code(index),
                }
            }
        }
        outcome
    }

    fn follow_anchor(&mut self, link: NodeId) {
        let outcome = follow_anchor(
            &self.document,
            link,
            &mut self.host.viewport,
            &self.host.layout,
        );
        if let AnchorOutcome::Scrolled {
            offset: Some(offset),
            ..
        } = outcome
        {
            self.scroll(offset);
        }
    }

    fn copy_code(&mut self, index: usize) {
        let Some(button) = self.copy_buttons.get(index) else {
            return;
        };
        let text = button.code_text(&self.document);
        let result = if self.host.capabilities.clipboard {
            self.host.clipboard_mut().write_text(&text)
        } else {
            Err(SprinkleError::new(
                "host.clipboard.unavailable",
                "clipboard access is not available",
            ))
        };
        self.timers.schedule(
            0,
            PageTask::ClipboardSettled {
                button: index,
                result,
            },
        );
    }

    /// Moves the viewport, then notifies the navbar and every observer.
    pub fn scroll(&mut self, offset: u32) -> NavbarVisibility {
        self.host.viewport.set_scroll_y(offset);
        if !self.scroll_listening {
            return self.navigation.visibility();
        }
        let visibility = self.navigation.on_scroll(&mut self.document, offset);
        self.refresh_intersections();
        visibility
    }

    /// Recomputes intersection records against current geometry and applies them.
    pub fn refresh_intersections(&mut self) {
        self.reveal
            .poll(&mut self.document, &self.host.layout, &self.host.viewport);
        self.lazy_images
            .poll(&mut self.document, &self.host.layout, &self.host.viewport);
    }

    /// Feeds raw observer entries, as the platform callback would.
    pub fn deliver(&mut self, kind: ObserverKind, entries: &[IntersectionEntry]) -> Vec<NodeId> {
        match kind {
            ObserverKind::Reveal => self.reveal.handle(&mut self.document, entries),
            ObserverKind::LazyImages => self.lazy_images.handle(&mut self.document, entries),
        }
    }

    /// Flips the color-scheme preference. Returns the theme now on the page.
    pub fn set_color_scheme(&mut self, prefers_dark: bool) -> Option<Theme> {
        let notify = self.host.color_scheme.set(prefers_dark);
        let theme = self.theme.as_mut()?;
        if notify {
            theme.on_change(&mut self.document, prefers_dark);
        }
        Some(theme.current())
    }

    /// Advances the virtual clock by `ms`, running due tasks in deadline order.
    pub fn advance(&mut self, ms: Millis) -> usize {
        let until = self.timers.now().saturating_add(ms);
        let mut ran = 0;
        while let Some((_, task)) = self.timers.pop_due(until) {
            self.run_task(task);
            ran += 1;
        }
        self.timers.advance_clock_to(until);
        ran
    }

    /// Runs tasks already due without moving the clock.
    pub fn run_pending(&mut self) -> usize {
        self.advance(0)
    }

    fn run_task(&mut self, task: PageTask) {
        match task {
            PageTask::ClipboardSettled { button, result } => match result {
                Ok(()) => self.confirm_copy(button),
                Err(error) => warn!(button, %error, "clipboard write failed; copy label unchanged"),
            },
            PageTask::RevertLabel { button } => {
                if let Some(copy) = self.copy_buttons.get_mut(button) {
                    copy.revert(&mut self.document, &self.config.copy);
                }
            }
        }
    }

    fn confirm_copy(&mut self, index: usize) {
        if index >= self.copy_buttons.len() {
            return;
        }
        let revert = self
            .timers
            .schedule(self.config.copy.revert_delay_ms, PageTask::RevertLabel { button: index });
        let replaced = self
            .copy_buttons
            .get_mut(index)
            .and_then(|copy| copy.confirm(&mut self.document, &self.config.copy, revert));
        if let Some(previous) = replaced {
            self.timers.cancel(previous);
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn host(&self) -> &Host<C> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut Host<C> {
        &mut self.host
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.timers.pending()
    }

    pub fn is_ready(&self) -> bool {
        self.summary.is_some()
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn reveal(&self) -> &RevealEngine {
        &self.reveal
    }

    pub fn lazy_images(&self) -> &LazyImageLoader {
        &self.lazy_images
    }

    pub fn copy_buttons(&self) -> &[CopyButton] {
        &self.copy_buttons
    }

    pub fn external_links(&self) -> &[NodeId] {
        &self.external_links
    }

    pub fn toc(&self) -> Option<&TocModel> {
        self.toc.as_ref()
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme.map(|theme| theme.current())
    }
}
