use crate::worker::ParseFailurePolicy;
use serde::Deserialize;

/// Main configuration structure for Spell-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub listing: ListingConfig,
    pub detail: DetailConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Paginated listing pages to walk
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    /// Site section the listing lives under, without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Query string prefix the page identifier is appended to
    #[serde(rename = "query-parameters", default)]
    pub query_parameters: String,

    /// First position, inclusive
    #[serde(rename = "start-point")]
    pub start_point: u32,

    /// Last position, inclusive
    #[serde(rename = "end-point")]
    pub end_point: u32,

    /// Explicit identifiers used in place of numeric positions
    #[serde(default)]
    pub index: Option<Vec<String>>,
}

/// Where detail-page links found on listing pages are resolved against
#[derive(Debug, Clone, Deserialize)]
pub struct DetailConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,
}

/// Retry and backoff behaviour for failed page loads
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per page before the position is given up
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lower bound of the randomized base delay, in whole seconds
    #[serde(rename = "min-backoff-secs", default = "default_min_backoff")]
    pub min_backoff_secs: u64,

    /// Upper bound of the randomized base delay, in whole seconds
    #[serde(rename = "max-backoff-secs", default = "default_max_backoff")]
    pub max_backoff_secs: u64,

    /// Growth factor applied per failed attempt
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Ceiling for a single delay, in seconds
    #[serde(rename = "max-delay-secs", default = "default_max_delay")]
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_backoff_secs: default_min_backoff(),
            max_backoff_secs: default_max_backoff(),
            multiplier: default_multiplier(),
            max_delay_secs: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    10
}

fn default_min_backoff() -> u64 {
    5
}

fn default_max_backoff() -> u64 {
    15
}

fn default_multiplier() -> f64 {
    1.5
}

fn default_max_delay() -> u64 {
    120
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_user_agent() -> String {
    format!("spell-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

/// Two-stage pipeline configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Hand-off queue capacity; absent or zero means unbounded
    #[serde(rename = "queue-capacity", default)]
    pub queue_capacity: Option<usize>,

    /// What to do when a loaded page cannot be turned into a document
    #[serde(rename = "parse-failure", default)]
    pub parse_failure: ParseFailurePolicy,
}

impl PipelineConfig {
    /// Capacity to build the hand-off queue with, `None` for unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.queue_capacity.filter(|&c| c > 0)
    }
}

/// Site-specific CSS selectors consumed by the extraction strategies
///
/// These are data, not behaviour: the defaults match the reference site's
/// markup and any of them may be overridden from the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SelectorConfig {
    pub links: String,
    pub name: String,
    pub level: String,
    pub school: String,
    pub tags: String,
    pub classes: String,
    pub casting_time: String,
    pub duration: String,
    pub range: String,
    pub components: String,
    pub material: String,
    pub target: String,
    pub ritual: String,
    pub source: String,
    pub saving_throw: String,
    /// Paragraph groups, collected in this order
    pub texts: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            links: "td.views-field-title a".to_string(),
            name: "h1.page-header".to_string(),
            level: ".field--name-field-spell-level a".to_string(),
            school: ".field--name-field-classical-spell-school a".to_string(),
            tags: ".field--name-field-spell-schools .field--item a".to_string(),
            classes: ".field--name-field-spell-classes .field--item a".to_string(),
            casting_time: ".field--name-field-spell-casting-time .field--item".to_string(),
            duration: "#duration .duration-value a".to_string(),
            range: ".field--name-field-spell-range .field--item a".to_string(),
            components: "#spell-components-display .component-value a".to_string(),
            material: "div.field.field--name-field-spellcomponent-description.field--type-string.field--label-hidden.field--item".to_string(),
            target: ".field--name-field-spell-target .field--item".to_string(),
            ritual: ".ritual-note .ritual-indicator".to_string(),
            source: ".field--name-field-spell-source .field--item a".to_string(),
            saving_throw: ".field.field--name-field-spell-saving-throw-desc .field--item".to_string(),
            texts: vec![
                "#spell-body .field.field--name-body.field--type-text-with-summary.field--label-hidden.field--item p".to_string(),
                ".field.field--name-field-spellcast-at-higher-levels .field--label".to_string(),
                ".field--name-field-spellcast-at-higher-levels .field--item p".to_string(),
                ".field--name-field-spell-rare-versions .field--label".to_string(),
                ".field--name-field-spell-rare-versions .field--item p".to_string(),
            ],
        }
    }
}
