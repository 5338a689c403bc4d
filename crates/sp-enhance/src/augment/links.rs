//! Markers for links that leave the site.

use crate::config::EnhanceConfig;
use crate::config::ExternalLinkPolicy;
use crate::select_all;
use sp_dom::Document;
use sp_dom::NodeId;
use sp_host::PageLocation;
use tracing::debug;

const ICON_STYLE: [(&str, &str); 2] = [("margin-left", "4px"), ("font-size", "0.8em")];

pub fn is_external(href: &str, location: &PageLocation, policy: ExternalLinkPolicy) -> bool {
    match policy {
        ExternalLinkPolicy::Legacy => false,
        ExternalLinkPolicy::SameHost => location
            .resolve(href)
            .and_then(|url| url.host_str().map(str::to_owned))
            .is_some_and(|host| !host.eq_ignore_ascii_case(location.hostname())),
    }
}

/// Opens external links in a new tab and appends the external-link icon.
/// Returns the decorated links.
pub fn decorate_external_links(
    document: &mut Document,
    config: &EnhanceConfig,
    location: &PageLocation,
) -> Vec<NodeId> {
    let policy = config.external_links.policy;
    let links = select_all(document, &config.selectors.external_link)
        .into_iter()
        .filter(|link| {
            document
                .attribute(*link, "href")
                .is_some_and(|href| is_external(href, location, policy))
        })
        .collect::<Vec<_>>();

    for link in &links {
        document.set_attribute(*link, "target", "_blank");
        document.set_attribute(*link, "rel", "noopener noreferrer");

        let icon = document.create_element_with_attrs(
            "i",
            vec![("class".to_owned(), config.external_links.icon_class.clone())],
        );
        for (property, value) in ICON_STYLE {
            document.set_style_property(icon, property, value);
        }
        if let Err(error) = document.append_child(*link, icon) {
            debug!(%error, "external link icon not attached");
        }
    }

    links
}
