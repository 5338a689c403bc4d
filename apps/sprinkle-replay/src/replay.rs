//! Applies the enhancer to a page and replays a scenario against it.

use crate::scenario::Scenario;
use crate::scenario::Step;
use sp_core::SprinkleError;
use sp_core::SprinkleResult;
use sp_dom::Document;
use sp_dom::NodeId;
use sp_enhance::EnhanceConfig;
use sp_enhance::ObservationState;
use sp_enhance::Page;
use sp_enhance::augment::CopyLabel;
use sp_host::Host;
use sp_host::PageLocation;
use sp_host::Viewport;
use tracing::debug;

/// Result of one replay: the trace lines and the enhanced document.
#[derive(Debug)]
pub struct ReplayOutput {
    pub trace: Vec<String>,
    pub document: Document,
}

pub fn replay(document: Document, scenario: &Scenario, config: EnhanceConfig) -> SprinkleResult<ReplayOutput> {
    let host = Host::new(PageLocation::parse(&scenario.page_url)?)
        .with_viewport(Viewport::new(scenario.viewport.width, scenario.viewport.height))
        .with_prefers_dark(scenario.prefers_dark)
        .with_capabilities(scenario.capabilities.into());
    let mut page = Page::new(document, host, config)?;
    let mut trace = Vec::new();

    let summary = page.ready();
    trace.push(format!(
        "t={} ready anchors={} reveal={} copy_buttons={} external_links={} toc_entries={} theme={} lazy_images={}",
        page.now(),
        summary.anchor_links,
        summary.reveal_targets,
        summary.copy_buttons,
        summary.external_links,
        summary.toc_entries,
        summary.theme.as_str(),
        summary.lazy_images,
    ));

    place_boxes(&mut page, scenario);
    page.refresh_intersections();

    for step in &scenario.steps {
        let line = run_step(&mut page, step)?;
        trace.push(format!("t={} {line}", page.now()));
    }

    trace.push(final_state(&page));
    Ok(ReplayOutput {
        trace,
        document: page.into_document(),
    })
}

fn place_boxes(page: &mut Page, scenario: &Scenario) {
    for element_box in &scenario.boxes {
        let matches = page
            .document()
            .query_selector_all(page.document().root(), &element_box.selector)
            .unwrap_or_default();
        if matches.is_empty() {
            debug!(selector = element_box.selector.as_str(), "box selector matched nothing");
        }
        for (index, node) in matches.into_iter().enumerate() {
            page.host_mut().layout.set(node, element_box.rect_for(index));
        }
    }
}

fn run_step(page: &mut Page, step: &Step) -> SprinkleResult<String> {
    let line = match step {
        Step::Scroll(offset) => {
            let visibility = page.scroll(*offset);
            format!("scroll {offset} navbar={visibility:?}")
        }
        Step::Click(selector) => {
            let target = find(page.document(), selector)?;
            let outcome = page.click(target);
            format!(
                "click {selector} handled={} default_prevented={} scroll_y={}",
                outcome.handled,
                outcome.default_prevented,
                page.host().viewport.scroll_y()
            )
        }
        Step::PrefersDark(prefers_dark) => {
            let theme = page.set_color_scheme(*prefers_dark);
            format!(
                "prefers_dark {prefers_dark} theme={}",
                theme.map_or("unset", |theme| theme.as_str())
            )
        }
        Step::Advance(ms) => {
            let ran = page.advance(*ms);
            format!("advance {ms} tasks={ran} labels=[{}]", copy_labels(page))
        }
        Step::ClipboardFails(fails) => {
            page.host_mut().clipboard_mut().set_deny_writes(*fails);
            format!("clipboard_fails {fails}")
        }
    };
    Ok(line)
}

fn find(document: &Document, selector: &str) -> SprinkleResult<NodeId> {
    document
        .query_selector(document.root(), selector)?
        .ok_or_else(|| {
            SprinkleError::new(
                "replay.step.no_match",
                format!("click selector `{selector}` matched nothing"),
            )
        })
}

fn copy_labels(page: &Page) -> String {
    page.copy_buttons()
        .iter()
        .map(|button| match button.label() {
            CopyLabel::Idle => "idle",
            CopyLabel::Confirmed => "confirmed",
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn final_state(page: &Page) -> String {
    let document = page.document();
    let revealed = document
        .descendants(document.root())
        .filter(|node| page.reveal().state(*node) == Some(ObservationState::Revealed))
        .count();
    let loaded = document
        .descendants(document.root())
        .filter(|node| page.lazy_images().state(*node) == Some(ObservationState::Revealed))
        .count();
    format!(
        "final menu={:?} navbar={:?} scroll_y={} theme={} revealed={}/{} lazy_loaded={}/{} labels=[{}] clipboard={:?}",
        page.navigation().menu_state(),
        page.navigation().visibility(),
        page.host().viewport.scroll_y(),
        page.theme().map_or("unset", |theme| theme.as_str()),
        revealed,
        page.reveal().target_count(),
        loaded,
        page.lazy_images().image_count(),
        copy_labels(page),
        page.host().clipboard().contents().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::replay;
    use crate::scenario::Scenario;
    use sp_enhance::EnhanceConfig;
    use sp_html::HtmlParser;

    const PAGE: &str = r#"<html><body><nav class="navbar"><button class="nav-toggle">Menu</button><ul class="nav-menu"></ul></nav><div class="feature-card">A</div><pre><code>make docs</code></pre></body></html>"#;

    #[test]
    fn replays_scripted_session() {
        let scenario = Scenario::from_toml_str(
            r#"
            page_url = "https://docs.example.com/"

            [[boxes]]
            selector = ".feature-card"
            y = 1200
            height = 200

            [[steps]]
            scroll = 600

            [[steps]]
            click = ".nav-toggle"

            [[steps]]
            click = ".copy-button"

            [[steps]]
            advance = 0

            [[steps]]
            advance = 2000
            "#,
        )
        .unwrap_or_else(|_| unreachable!());
        let output = replay(HtmlParser.parse(PAGE), &scenario, EnhanceConfig::default())
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(output.trace.len(), 7);
        assert!(output.trace[0].starts_with("t=0 ready"));
        assert_eq!(output.trace[1], "t=0 scroll 600 navbar=Hidden");
        assert_eq!(output.trace[4], "t=0 advance 0 tasks=1 labels=[confirmed]");
        assert_eq!(output.trace[5], "t=2000 advance 2000 tasks=1 labels=[idle]");
        assert!(output.trace[6].contains("menu=Open"));
        assert!(output.trace[6].contains("revealed=1/1"));
        assert!(output.trace[6].contains("clipboard=\"make docs\""));
    }

    #[test]
    fn unmatched_click_selector_is_an_error() {
        let scenario = Scenario::from_toml_str("[[steps]]\nclick = \".missing\"\n")
            .unwrap_or_else(|_| unreachable!());
        let result = replay(HtmlParser.parse(PAGE), &scenario, EnhanceConfig::default());
        assert!(result.is_err_and(|error| error.code == "replay.step.no_match"));
    }
}
