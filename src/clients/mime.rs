use http::HeaderValue;
use mime::Mime;
use std::str::FromStr;

/// Compares only the "type/subtype" essence of `content_type`, ignoring any
/// suffix or parameters.
pub(crate) fn content_type_equal(content_type: &HeaderValue, expected: &str) -> bool {
    let content_type = match content_type.to_str() {
        Ok(t) => t,
        Err(_err) => return false,
    };
    let content_type = match Mime::from_str(content_type) {
        Ok(t) => t,
        Err(_err) => return false,
    };

    content_type.essence_str() == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_equal() {
        let tests = [
            ("application/dns-message", true),
            ("application/dns-message; charset=utf-8", true),
            ("application/dns-json", false),
            ("text/html", false),
            ("not a mime type", false),
        ];

        for (content_type, want) in tests {
            let header = HeaderValue::from_static(content_type);
            assert_eq!(
                content_type_equal(&header, "application/dns-message"),
                want,
                "content_type_equal({:?})",
                content_type
            );
        }
    }
}
