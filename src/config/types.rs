use serde::Deserialize;
use std::collections::BTreeMap;

/// Browser identification sent on direct fetches
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Platform keys in their canonical order
pub const KNOWN_PLATFORMS: [&str; 4] = ["ebay", "mercari", "facebook", "craigslist"];

/// Main configuration structure for Price-Ripple
///
/// Every section is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub proxy: ProxyConfig,
    pub actor: ActorConfig,
    pub server: ServerConfig,
    /// Per-platform overrides keyed by platform key
    pub platforms: BTreeMap<String, SiteConfig>,
}

/// Outbound HTTP behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout for direct page fetches (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Timeout for fetches through the render proxy (seconds)
    #[serde(rename = "proxy-timeout-secs")]
    pub proxy_timeout_secs: u64,

    /// Maximum redirects followed on a direct fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// User agent presented to marketplaces
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            proxy_timeout_secs: 60,
            max_redirects: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Search request defaults and fan-out behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Results per platform when the caller does not specify a bound
    #[serde(rename = "default-max-results")]
    pub default_max_results: usize,

    /// Largest per-platform bound a caller may ask for
    #[serde(rename = "max-results-limit")]
    pub max_results_limit: usize,

    /// Deadline for a single platform inside a fan-out (seconds)
    #[serde(rename = "platform-timeout-secs")]
    pub platform_timeout_secs: u64,

    /// Platform keys searched by a comparison, in order
    pub platforms: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_results: 5,
            max_results_limit: 50,
            platform_timeout_secs: 90,
            platforms: KNOWN_PLATFORMS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Render-capable fetch proxy settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy endpoint accepting `api_key`, `url` and `render` parameters
    pub endpoint: String,

    /// Name of the environment variable holding the proxy API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://api.scraperapi.com".to_string(),
            api_key_env: "SCRAPERAPI_KEY".to_string(),
        }
    }
}

/// Job-based scraping actor settings (alternative Facebook path)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Use the actor instead of the render proxy for Facebook
    pub enabled: bool,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Actor identifier
    #[serde(rename = "actor-id")]
    pub actor_id: String,

    /// Name of the environment variable holding the API token
    #[serde(rename = "token-env")]
    pub token_env: String,

    /// Delay between run status polls (milliseconds)
    #[serde(rename = "poll-interval-ms")]
    pub poll_interval_ms: u64,

    /// Maximum number of status polls before giving up
    #[serde(rename = "max-polls")]
    pub max_polls: u32,

    /// Optional lower price bound passed to the actor
    #[serde(rename = "min-price")]
    pub min_price: Option<u32>,

    /// Optional upper price bound passed to the actor
    #[serde(rename = "max-price")]
    pub max_price: Option<u32>,

    /// Sort mode passed to the actor
    pub sort: String,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.apify.com/v2".to_string(),
            actor_id: "apify~facebook-marketplace-scraper".to_string(),
            token_env: "APIFY_TOKEN".to_string(),
            poll_interval_ms: 5000,
            max_polls: 16,
            min_price: None,
            max_price: None,
            sort: "best_match".to_string(),
        }
    }
}

/// HTTP API settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Per-platform override
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Replaces the platform's base URL. For Craigslist a `{site}`
    /// placeholder is replaced with the location's site slug.
    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Fixed price given to the placeholder record on degraded extraction
    #[serde(rename = "placeholder-price")]
    pub placeholder_price: Option<f64>,
}

/// Secrets resolved from the environment at startup
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    pub proxy_api_key: Option<String>,
    pub actor_token: Option<String>,
}

impl Secrets {
    /// Reads the variables named by the configuration
    ///
    /// Empty values are treated as unset.
    pub fn from_env(config: &Config) -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            proxy_api_key: read(&config.proxy.api_key_env),
            actor_token: read(&config.actor.token_env),
        }
    }
}
