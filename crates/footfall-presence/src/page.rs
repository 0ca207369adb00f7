//! Page path canonicalisation.
//!
//! Clients report whatever their router says. Paths are reduced to a
//! bounded, host-free form so a misbehaving client cannot grow the page
//! key set with query strings or full URLs.

use footfall_common::PresenceError;

/// Canonical form of a client-reported page path.
///
/// Query and fragment are dropped and a trailing slash is removed (except
/// for `/`). Absolute or scheme-relative URLs, relative paths, control
/// characters and paths longer than `max_len` bytes are rejected.
pub fn canonical_page(raw: &str, max_len: usize) -> Result<String, PresenceError> {
    let trimmed = raw.trim();
    let path = match trimmed.find(|c: char| c == '?' || c == '#') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };

    if path.contains("://") || path.starts_with("//") || !path.starts_with('/') {
        return Err(PresenceError::InvalidPage(preview(raw)));
    }
    if path.chars().any(char::is_control) {
        return Err(PresenceError::InvalidPage(preview(raw)));
    }
    if path.len() > max_len {
        return Err(PresenceError::InvalidPage(format!(
            "{} bytes exceeds limit of {max_len}",
            path.len()
        )));
    }

    let path = path.trim_end_matches('/');
    if path.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(path.to_string())
    }
}

fn preview(raw: &str) -> String {
    raw.chars()
        .take(64)
        .map(|c| if c.is_control() { '?' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_stays_root() {
        assert_eq!(canonical_page("/", 256).unwrap(), "/");
        assert_eq!(canonical_page("  /  ", 256).unwrap(), "/");
    }

    #[test]
    fn strips_query_and_fragment() {
        assert_eq!(canonical_page("/products?cat=3", 256).unwrap(), "/products");
        assert_eq!(canonical_page("/about#team", 256).unwrap(), "/about");
        assert_eq!(canonical_page("/?utm=x#top", 256).unwrap(), "/");
    }

    #[test]
    fn trims_trailing_slashes() {
        assert_eq!(canonical_page("/products/", 256).unwrap(), "/products");
        assert_eq!(canonical_page("/ar/gallery//", 256).unwrap(), "/ar/gallery");
    }

    #[test]
    fn rejects_absolute_urls() {
        assert!(canonical_page("https://example.com/products", 256).is_err());
        assert!(canonical_page("//example.com/products", 256).is_err());
    }

    #[test]
    fn rejects_relative_and_empty() {
        assert!(canonical_page("products", 256).is_err());
        assert!(canonical_page("", 256).is_err());
        assert!(canonical_page("?q=1", 256).is_err());
    }

    #[test]
    fn rejects_control_characters() {
        let err = canonical_page("/pro\nducts", 256).unwrap_err();
        assert!(matches!(err, PresenceError::InvalidPage(ref msg) if !msg.contains('\n')));
    }

    #[test]
    fn enforces_length_limit() {
        let long = format!("/{}", "a".repeat(300));
        assert!(canonical_page(&long, 256).is_err());
        assert!(canonical_page(&long, 512).is_ok());
    }

    #[test]
    fn query_does_not_count_towards_limit() {
        let page = format!("/products?{}", "x".repeat(500));
        assert_eq!(canonical_page(&page, 64).unwrap(), "/products");
    }
}
