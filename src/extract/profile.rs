//! Platform profiles: everything that differs between marketplaces
//!
//! A profile bundles a platform's search URL rule, query encoding, fetch mode
//! and ordered selector tables. The extraction pipeline itself is shared.

use crate::config::SiteConfig;
use crate::listing::{SearchQuery, CHECK_LISTING, NOT_SPECIFIED};
use crate::url::{encode_query, fill_site_template, location_slug, QueryEncoding};
use crate::CompareError;

/// Supported marketplaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Ebay,
    Mercari,
    Facebook,
    Craigslist,
}

impl PlatformKind {
    /// All platforms in canonical order
    pub const ALL: [PlatformKind; 4] = [Self::Ebay, Self::Mercari, Self::Facebook, Self::Craigslist];

    /// Stable key used in configuration, URLs and result maps
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ebay => "ebay",
            Self::Mercari => "mercari",
            Self::Facebook => "facebook",
            Self::Craigslist => "craigslist",
        }
    }

    /// Display name stored on listing records
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ebay => "eBay",
            Self::Mercari => "Mercari",
            Self::Facebook => "Facebook Marketplace",
            Self::Craigslist => "Craigslist",
        }
    }

    /// Parses a platform key (case-insensitive)
    pub fn from_key(key: &str) -> Result<Self, CompareError> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(key.trim()))
            .ok_or_else(|| CompareError::UnknownPlatform(key.to_string()))
    }
}

/// How a platform's search page is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain request with browser headers; the platform tolerates it
    Direct,
    /// Through the render proxy, optionally executing page scripts
    Proxy { render: bool },
}

/// Ordered candidate selectors for each part of a listing
///
/// Within each list the first selector producing non-empty text wins.
#[derive(Debug, Clone)]
pub struct SelectorTable {
    /// Item container candidates, tried in order until one matches
    pub containers: &'static [&'static str],
    pub title: &'static [&'static str],
    pub price: &'static [&'static str],
    pub link: &'static [&'static str],
    pub condition: &'static [&'static str],
    pub shipping: &'static [&'static str],
    /// Seller location (neighbourhood), used for local-pickup platforms
    pub location: &'static [&'static str],
}

/// Everything the shared pipeline needs to know about one platform
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub kind: PlatformKind,

    /// Base URL, possibly a `{site}` template
    pub base_url: String,

    pub encoding: QueryEncoding,
    pub fetch_mode: FetchMode,
    pub selectors: SelectorTable,

    /// Titles containing any of these markers are not listings
    pub skip_contains: &'static [&'static str],

    /// Titles starting with any of these markers are not listings
    pub skip_prefixes: &'static [&'static str],

    /// Condition used when the markup has none
    pub default_condition: &'static str,

    /// Shipping used when the markup has none
    pub default_shipping: &'static str,

    /// Shipping is reported as local pickup at the seller's location
    pub local_pickup: bool,

    /// Location slug used when the query has no location
    pub default_site: &'static str,

    /// Fixed positive price on the degraded-extraction placeholder
    pub placeholder_price: f64,
}

const EBAY_SELECTORS: SelectorTable = SelectorTable {
    containers: &[
        "div.s-item__wrapper",
        "div.s-item",
        "li.s-item",
        "li.s-card",
    ],
    title: &[
        "h3.s-item__title",
        ".s-item__title",
        ".s-card__title",
        "h3",
        "[role='heading']",
    ],
    price: &["span.s-item__price", ".s-item__price", ".s-card__price"],
    link: &["a.s-item__link", "a.su-link", "a[href]"],
    condition: &["span.SECONDARY_INFO", ".s-item__subtitle", ".s-card__subtitle"],
    shipping: &[
        "span.s-item__shipping",
        ".s-item__logisticsCost",
        ".s-item__freeXDays",
    ],
    location: &["span.s-item__location", ".s-item__itemLocation"],
};

const MERCARI_SELECTORS: SelectorTable = SelectorTable {
    containers: &[
        "div[data-testid='ItemContainer']",
        "div[data-testid='SearchResults'] a[href*='/item/']",
        "li[data-testid='ItemCell']",
        "article",
        "a[href*='/item/']",
    ],
    title: &[
        "[data-testid='ItemName']",
        "[class*='itemName']",
        "[class*='ItemName']",
        "h3",
        "p",
    ],
    price: &[
        "[data-testid='ItemPrice']",
        "[class*='priceLabel']",
        "[class*='Price']",
        "[class*='price']",
    ],
    link: &["a[href*='/item/']", "a[href]"],
    condition: &["[data-testid='ItemCondition']", "[class*='condition']"],
    shipping: &["[data-testid='ItemShipping']", "[class*='shipping']"],
    location: &[],
};

const FACEBOOK_SELECTORS: SelectorTable = SelectorTable {
    containers: &[
        "div[role='article']",
        "a[href*='/marketplace/item/']",
    ],
    title: &[
        "span[style*='-webkit-line-clamp']",
        "[class*='title']",
        "img[alt]",
        "span",
    ],
    price: &["span[dir='auto']", "[class*='price']", "span"],
    link: &["a[href*='/marketplace/item/']", "a[href]"],
    condition: &[],
    shipping: &[],
    location: &["[class*='location']"],
};

const CRAIGSLIST_SELECTORS: SelectorTable = SelectorTable {
    containers: &[
        "li.result-row",
        "li.cl-static-search-result",
        "li.cl-search-result",
        "div.result-info",
    ],
    title: &[
        "a.result-title",
        ".title",
        ".posting-title .label",
        "a.titlestring",
    ],
    price: &["span.result-price", ".price", ".priceinfo"],
    link: &["a.result-title", "a.posting-title", "a[href]"],
    condition: &[],
    shipping: &[],
    location: &["span.result-hood", ".location", ".meta .supertitle"],
};

impl PlatformProfile {
    /// Returns the built-in profile for a platform
    pub fn builtin(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Ebay => Self {
                kind,
                base_url: "https://www.ebay.com".to_string(),
                encoding: QueryEncoding::Plus,
                fetch_mode: FetchMode::Direct,
                selectors: EBAY_SELECTORS,
                skip_contains: &["Shop on eBay", "Sponsored"],
                skip_prefixes: &["Shop"],
                default_condition: NOT_SPECIFIED,
                default_shipping: NOT_SPECIFIED,
                local_pickup: false,
                default_site: "",
                placeholder_price: 100.0,
            },
            PlatformKind::Mercari => Self {
                kind,
                base_url: "https://www.mercari.com".to_string(),
                encoding: QueryEncoding::Percent,
                fetch_mode: FetchMode::Proxy { render: true },
                selectors: MERCARI_SELECTORS,
                skip_contains: &["Sponsored"],
                skip_prefixes: &[],
                default_condition: CHECK_LISTING,
                default_shipping: CHECK_LISTING,
                local_pickup: false,
                default_site: "",
                placeholder_price: 85.0,
            },
            PlatformKind::Facebook => Self {
                kind,
                base_url: "https://www.facebook.com".to_string(),
                encoding: QueryEncoding::Percent,
                fetch_mode: FetchMode::Proxy { render: true },
                selectors: FACEBOOK_SELECTORS,
                skip_contains: &["Sponsored"],
                skip_prefixes: &[],
                default_condition: NOT_SPECIFIED,
                default_shipping: "Local pickup only",
                local_pickup: true,
                default_site: "sanfrancisco",
                placeholder_price: 90.0,
            },
            PlatformKind::Craigslist => Self {
                kind,
                base_url: "https://{site}.craigslist.org".to_string(),
                encoding: QueryEncoding::Plus,
                fetch_mode: FetchMode::Proxy { render: false },
                selectors: CRAIGSLIST_SELECTORS,
                skip_contains: &[],
                skip_prefixes: &[],
                default_condition: "Used",
                default_shipping: "Local pickup",
                local_pickup: true,
                default_site: "sfbay",
                placeholder_price: 150.0,
            },
        }
    }

    /// Returns the built-in profile with configuration overrides applied
    pub fn configured(kind: PlatformKind, site: Option<&SiteConfig>) -> Self {
        let mut profile = Self::builtin(kind);

        if let Some(site) = site {
            if let Some(base_url) = &site.base_url {
                profile.base_url = base_url.clone();
            }
            if let Some(price) = site.placeholder_price {
                profile.placeholder_price = price;
            }
        }

        profile
    }

    pub fn key(&self) -> &'static str {
        self.kind.key()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Builds the search page URL for a query
    ///
    /// # Examples
    ///
    /// ```
    /// use price_ripple::extract::{PlatformKind, PlatformProfile};
    /// use price_ripple::listing::SearchQuery;
    ///
    /// let query = SearchQuery::new("iPhone 12", 3, 50).unwrap();
    /// let ebay = PlatformProfile::builtin(PlatformKind::Ebay);
    /// assert_eq!(
    ///     ebay.search_url(&query),
    ///     "https://www.ebay.com/sch/i.html?_nkw=iPhone+12&_ipg=3&LH_BIN=1"
    /// );
    /// ```
    pub fn search_url(&self, query: &SearchQuery) -> String {
        let q = encode_query(&query.text, self.encoding);
        let site = location_slug(query.location.as_ref(), self.default_site);
        let base = fill_site_template(&self.base_url, &site);

        match self.kind {
            PlatformKind::Ebay => format!(
                "{}/sch/i.html?_nkw={}&_ipg={}&LH_BIN=1",
                base, q, query.max_results
            ),
            PlatformKind::Mercari => format!("{}/search/?keyword={}", base, q),
            PlatformKind::Facebook => {
                format!("{}/marketplace/{}/search/?query={}", base, site, q)
            }
            PlatformKind::Craigslist => format!("{}/search/sss?query={}&sort=rel", base, q),
        }
    }

    /// Returns true if a title marks a promotional or sponsored artifact
    pub fn is_artifact(&self, title: &str) -> bool {
        self.skip_contains.iter().any(|marker| title.contains(marker))
            || self.skip_prefixes.iter().any(|marker| title.starts_with(marker))
    }
}
