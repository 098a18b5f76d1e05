use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum UpstreamUrlError {
    #[error("upstream URL is empty")]
    Empty,

    #[error("upstream URL '{url}' is not a valid absolute URL: {reason}")]
    Malformed { url: String, reason: String },

    #[error("upstream URL '{url}' must use the http or https scheme")]
    UnsupportedScheme { url: String },

    #[error("upstream URL '{url}' has no host")]
    MissingHost { url: String },
}

/// Immutable base URL of the backend API.
///
/// Validated once at construction; a malformed value is a deployment error
/// and aborts startup instead of surfacing on the first request.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    scheme: String,
    authority: String,
    base_path: String,
}

impl UpstreamTarget {
    pub fn parse(raw: &str) -> Result<Self, UpstreamUrlError> {
        if raw.trim().is_empty() {
            return Err(UpstreamUrlError::Empty);
        }

        let url = Url::parse(raw).map_err(|err| UpstreamUrlError::Malformed {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            _ => {
                return Err(UpstreamUrlError::UnsupportedScheme {
                    url: raw.to_string(),
                });
            }
        }

        let host = url.host_str().ok_or_else(|| UpstreamUrlError::MissingHost {
            url: raw.to_string(),
        })?;

        // Url::port() is None for the scheme's default port, so default
        // ports never leak into the Host header.
        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            scheme: url.scheme().to_string(),
            authority,
            base_path: url.path().trim_end_matches('/').to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Absolute URL for a path remainder (no leading slash) under the base
    /// path, with an optional raw query string.
    pub fn endpoint(&self, rest: &str, query: Option<&str>) -> String {
        let query = query.map(|q| format!("?{q}")).unwrap_or_default();
        format!(
            "{}://{}{}/{}{}",
            self.scheme, self.authority, self.base_path, rest, query
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_https_url() {
        let target = UpstreamTarget::parse("https://api.example.com").unwrap();
        assert_eq!(target.scheme(), "https");
        assert_eq!(target.authority(), "api.example.com");
        assert_eq!(target.base_path(), "");
    }

    #[test]
    fn keeps_non_default_port_in_authority() {
        let target = UpstreamTarget::parse("http://10.0.0.5:8090").unwrap();
        assert_eq!(target.authority(), "10.0.0.5:8090");
    }

    #[test]
    fn drops_default_port_from_authority() {
        let target = UpstreamTarget::parse("https://api.example.com:443").unwrap();
        assert_eq!(target.authority(), "api.example.com");
    }

    #[test]
    fn trims_trailing_slash_from_base_path() {
        let target = UpstreamTarget::parse("https://api.example.com/gateway/").unwrap();
        assert_eq!(target.base_path(), "/gateway");
        assert_eq!(
            target.endpoint("v2/clusters", None),
            "https://api.example.com/gateway/v2/clusters"
        );
    }

    #[test]
    fn endpoint_appends_query_string() {
        let target = UpstreamTarget::parse("https://api.example.com").unwrap();
        assert_eq!(
            target.endpoint("v2/clusters", Some("x=1")),
            "https://api.example.com/v2/clusters?x=1"
        );
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(matches!(
            UpstreamTarget::parse(""),
            Err(UpstreamUrlError::Empty)
        ));
        assert!(matches!(
            UpstreamTarget::parse("   "),
            Err(UpstreamUrlError::Empty)
        ));
    }

    #[test]
    fn malformed_url_is_rejected() {
        assert!(matches!(
            UpstreamTarget::parse("not a url"),
            Err(UpstreamUrlError::Malformed { .. })
        ));
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        assert!(matches!(
            UpstreamTarget::parse("ftp://api.example.com"),
            Err(UpstreamUrlError::UnsupportedScheme { .. })
        ));
    }
}
