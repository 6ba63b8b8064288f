//! Extraction strategies
//!
//! A strategy turns a parsed document into one typed result. Strategies are
//! built once from selector data and are read-only while a worker runs.
//!
//! Documents are parsed with `scraper`; `Html` is not `Send`, so parsing and
//! extraction happen together in synchronous code and only the extracted
//! value travels across `.await` points.

mod links;
mod spell;
pub mod text;

pub use links::LinkListStrategy;
pub use spell::{SpellSelectors, SpellStrategy};

use crate::{DocumentError, StrategyError};
use scraper::{Html, Selector};

/// A pluggable extraction algorithm producing one `Output` per document
pub trait ParsingStrategy: Send + Sync {
    type Output: Send + 'static;

    /// Short label used in log lines
    fn name(&self) -> &'static str;

    /// Extracts a result from the document; missing elements yield defaults
    fn parse(&self, document: &Html) -> Self::Output;
}

/// Turns raw markup into a document tree
///
/// The HTML parser recovers from any malformed input, so a failure here
/// means the markup produced no element content at all.
pub fn parse_document(markup: &str) -> Result<Html, DocumentError> {
    if markup.trim().is_empty() {
        return Err(DocumentError::Empty);
    }

    let document = Html::parse_document(markup);

    if !document.errors.is_empty() {
        tracing::trace!("Recovered from {} markup errors", document.errors.len());
    }

    let has_content = document
        .root_element()
        .descendants()
        .filter_map(|node| node.value().as_element())
        .any(|element| !matches!(element.name(), "html" | "head" | "body"));

    if has_content {
        Ok(document)
    } else {
        Err(DocumentError::Empty)
    }
}

/// Parses markup and runs a strategy over it in one synchronous step
pub fn extract<S: ParsingStrategy + ?Sized>(
    strategy: &S,
    markup: &str,
) -> Result<S::Output, DocumentError> {
    let document = parse_document(markup)?;
    Ok(strategy.parse(&document))
}

pub(crate) fn compile(field: &str, selector: &str) -> Result<Selector, StrategyError> {
    Selector::parse(selector).map_err(|_| StrategyError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}
