//! `Link` response header parsing.

/// Extracts the `rel="next"` target from a `Link` header value.
///
/// The header carries a comma-separated list of `<url>; rel="relation"`
/// entries; only the `next` relation matters for pagination.
pub(crate) fn next_page(header: &str) -> Option<String> {
    for entry in header.split(',') {
        let mut parts = entry.split(';');
        let target = parts.next().unwrap_or_default().trim();
        let Some(url) = target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
        else {
            continue;
        };

        for param in parts {
            let param = param.trim();
            if param == "rel=\"next\"" || param == "rel=next" {
                return Some(url.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_next_link() {
        let header = "<https://api.example.com/repos/acme/widget/releases?page=2>; rel=\"next\"";
        assert_eq!(
            next_page(header),
            Some("https://api.example.com/repos/acme/widget/releases?page=2".to_string())
        );
    }

    #[test]
    fn test_next_among_multiple_relations() {
        let header = "<https://api.example.com/x?page=3>; rel=\"prev\", \
                      <https://api.example.com/x?page=5>; rel=\"next\", \
                      <https://api.example.com/x?page=9>; rel=\"last\"";
        assert_eq!(
            next_page(header),
            Some("https://api.example.com/x?page=5".to_string())
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = "<https://api.example.com/x?page=1>; rel=\"first\", \
                      <https://api.example.com/x?page=4>; rel=\"prev\"";
        assert_eq!(next_page(header), None);
    }

    #[test]
    fn test_unquoted_rel() {
        let header = "<https://api.example.com/x?page=2>; rel=next";
        assert_eq!(
            next_page(header),
            Some("https://api.example.com/x?page=2".to_string())
        );
    }

    #[test]
    fn test_malformed_header() {
        assert_eq!(next_page("not a link header"), None);
        assert_eq!(next_page(""), None);
    }
}
