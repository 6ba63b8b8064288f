use crate::config::SelectorConfig;
use crate::model::LinkList;
use crate::strategy::{compile, ParsingStrategy};
use crate::StrategyError;
use scraper::{Html, Selector};

/// Collects the `href` of every anchor matched by one selector
///
/// Anchors without an `href`, or whose `href` is empty or only a fragment,
/// are skipped, so the list only ever holds usable paths.
#[derive(Debug, Clone)]
pub struct LinkListStrategy {
    selector: Selector,
}

impl LinkListStrategy {
    pub fn new(selector: &str) -> Result<Self, StrategyError> {
        Ok(Self {
            selector: compile("links", selector)?,
        })
    }

    pub fn from_config(config: &SelectorConfig) -> Result<Self, StrategyError> {
        Self::new(&config.links)
    }
}

impl ParsingStrategy for LinkListStrategy {
    type Output = LinkList;

    fn name(&self) -> &'static str {
        "link-list"
    }

    fn parse(&self, document: &Html) -> LinkList {
        let mut unusable = 0usize;
        let links: LinkList = document
            .select(&self.selector)
            .filter_map(|element| match element.value().attr("href").map(str::trim) {
                Some(href) if is_page_link(href) => Some(href.to_string()),
                _ => {
                    unusable += 1;
                    None
                }
            })
            .collect();

        if unusable > 0 {
            tracing::debug!("Skipped {} anchors without a page href", unusable);
        }

        links
    }
}

/// False for hrefs that point back at the current page
fn is_page_link(href: &str) -> bool {
    !href.is_empty() && !href.starts_with('#')
}
