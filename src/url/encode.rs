/// How a platform expects spaces in its search query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryEncoding {
    /// Spaces become `+` (form encoding)
    Plus,
    /// Spaces become `%20`
    Percent,
}

/// Encodes query text for a search URL
///
/// Reserved characters are always percent-encoded; only the treatment of
/// spaces differs between the two conventions.
///
/// # Examples
///
/// ```
/// use price_ripple::url::{encode_query, QueryEncoding};
///
/// assert_eq!(encode_query("iPhone 12", QueryEncoding::Plus), "iPhone+12");
/// assert_eq!(encode_query("iPhone 12", QueryEncoding::Percent), "iPhone%2012");
/// ```
pub fn encode_query(text: &str, encoding: QueryEncoding) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");

    match encoding {
        QueryEncoding::Percent => urlencoding::encode(&normalized).into_owned(),
        QueryEncoding::Plus => normalized
            .split(' ')
            .map(|word| urlencoding::encode(word).into_owned())
            .collect::<Vec<_>>()
            .join("+"),
    }
}
