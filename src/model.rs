//! Records produced by the extraction strategies

use serde::{Deserialize, Serialize};

/// Detail-page paths extracted from one listing page, in document order
pub type LinkList = Vec<String>;

/// One spell detail page
///
/// Fields whose element was missing from the page keep their zero value;
/// `level` uses `-1` for "not found" since `0` means cantrip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellRecord {
    pub name: String,
    pub level: i32,
    pub school: String,
    pub tags: Vec<String>,
    pub casting_time: String,
    pub range: String,
    pub target: String,
    pub saving_throw: String,
    pub components: Vec<String>,
    pub duration: String,
    pub ritual: bool,
    pub classes: Vec<String>,
    pub texts: Vec<String>,
    pub source: String,
}

impl SpellRecord {
    /// Level value stored when the level element is missing or unparsable
    pub const LEVEL_NOT_FOUND: i32 = -1;

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }
}
