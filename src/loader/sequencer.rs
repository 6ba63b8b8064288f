//! URL sequencing for paginated sources
//!
//! A position in `[start_point, end_point]` becomes
//! `{base_url}/{query_parameters}{identifier}`, where the identifier is the
//! decimal position or, when an explicit index list is configured, the list
//! entry at that position.

use crate::config::ListingConfig;
use crate::{ConfigError, HarvestError};
use std::ops::RangeInclusive;

/// Immutable description of the pages a worker walks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    base_url: String,
    query_parameters: String,
    start_point: u32,
    end_point: u32,
    index: Option<Vec<String>>,
}

impl LoaderSettings {
    /// Creates settings, rejecting ranges the sequencer could not serve
    ///
    /// A trailing `/` on `base_url` is dropped so the separator is not doubled.
    ///
    /// # Errors
    ///
    /// * `HarvestError::Config` - `start_point` is past `end_point`
    /// * `HarvestError::IndexOutOfRange` - the explicit index does not reach `end_point`
    pub fn new(
        base_url: impl Into<String>,
        query_parameters: impl Into<String>,
        start_point: u32,
        end_point: u32,
        index: Option<Vec<String>>,
    ) -> Result<Self, HarvestError> {
        if start_point > end_point {
            return Err(ConfigError::Validation(format!(
                "start point {} is past end point {}",
                start_point, end_point
            ))
            .into());
        }

        if let Some(index) = &index {
            if index.len() <= end_point as usize {
                return Err(HarvestError::IndexOutOfRange {
                    position: end_point,
                    len: index.len(),
                });
            }
        }

        let base_url: String = base_url.into();

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            query_parameters: query_parameters.into(),
            start_point,
            end_point,
            index,
        })
    }

    /// Builds settings for the listing stage from configuration
    pub fn from_listing(config: &ListingConfig) -> Result<Self, HarvestError> {
        Self::new(
            config.base_url.as_str(),
            config.query_parameters.as_str(),
            config.start_point,
            config.end_point,
            config.index.clone(),
        )
    }

    /// Builds settings that walk an explicit list of identifiers from position 0
    ///
    /// Returns `None` for an empty list, which has no range to walk.
    pub fn from_identifiers(base_url: impl Into<String>, identifiers: Vec<String>) -> Option<Self> {
        let end_point = u32::try_from(identifiers.len().checked_sub(1)?).ok()?;
        Self::new(base_url, "", 0, end_point, Some(identifiers)).ok()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn query_parameters(&self) -> &str {
        &self.query_parameters
    }

    pub fn start_point(&self) -> u32 {
        self.start_point
    }

    pub fn end_point(&self) -> u32 {
        self.end_point
    }

    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    /// Every position the worker visits, inclusive on both ends
    pub fn positions(&self) -> RangeInclusive<u32> {
        self.start_point..=self.end_point
    }

    /// Number of positions in the range
    pub fn len(&self) -> usize {
        (self.end_point - self.start_point) as usize + 1
    }

    /// Always false; a range holds at least one position
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Produces the concrete URL for a position
    ///
    /// The URL is `{base_url}/{query_parameters}{identifier}`. `base_url` is
    /// stored without trailing slashes, so a base of `https://example.com/`
    /// yields `https://example.com/?page=0`, not `https://example.com//?page=0`.
    ///
    /// # Errors
    ///
    /// `HarvestError::IndexOutOfRange` when an explicit index is configured and
    /// `position` lies past its end.
    pub fn url_for(&self, position: u32) -> Result<String, HarvestError> {
        let identifier = match &self.index {
            Some(index) => index
                .get(position as usize)
                .ok_or(HarvestError::IndexOutOfRange {
                    position,
                    len: index.len(),
                })?
                .clone(),
            None => position.to_string(),
        };

        Ok(format!(
            "{}/{}{}",
            self.base_url, self.query_parameters, identifier
        ))
    }

    /// Sequences the whole range
    pub fn urls(&self) -> Result<Vec<String>, HarvestError> {
        self.positions().map(|p| self.url_for(p)).collect()
    }
}
