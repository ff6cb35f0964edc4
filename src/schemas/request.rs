use crate::errors::SchemaError;

const MAX_HEADERS: usize = 64;

/// A client request parsed into its structured fields.
///
/// Headers keep their original order so pass-through serialization reproduces
/// what the client sent, modulo the values the forwarder overwrites.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub method: String,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub version: String,
    headers: Vec<(String, String)>,
}

impl ParsedRequest {
    /// Parses a raw request head (through the `\r\n\r\n` terminator).
    pub fn parse(raw: &[u8]) -> Result<Self, SchemaError> {
        let mut header_storage = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut header_storage);

        let status = req
            .parse(raw)
            .map_err(|e| SchemaError::Malformed(e.to_string()))?;
        if status.is_partial() {
            return Err(SchemaError::Incomplete);
        }

        let method = req
            .method
            .ok_or_else(|| SchemaError::Malformed("missing method".into()))?
            .to_string();
        let target = req
            .path
            .ok_or_else(|| SchemaError::Malformed("missing request target".into()))?;
        let version = match req.version {
            Some(0) => "HTTP/1.0".to_string(),
            Some(1) => "HTTP/1.1".to_string(),
            Some(other) => format!("HTTP/1.{other}"),
            None => return Err(SchemaError::Malformed("missing version".into())),
        };

        let headers: Vec<(String, String)> = req
            .headers
            .iter()
            .map(|h| {
                (
                    h.name.to_string(),
                    String::from_utf8_lossy(h.value).into_owned(),
                )
            })
            .collect();

        let (host, port, path) = split_target(target, &headers)?;

        Ok(Self {
            method,
            host,
            port,
            path,
            version,
            headers,
        })
    }

    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Overwrites the first header with the given name, or appends one.
    pub fn set_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serializes the header block in wire format, including the terminating
    /// blank line. Fails if the block does not fit in `capacity` bytes.
    pub fn unparse_headers(&self, capacity: usize) -> Result<Vec<u8>, SchemaError> {
        let mut out = Vec::new();
        for (name, value) in &self.headers {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(b"\r\n");

        if out.len() > capacity {
            return Err(SchemaError::CapacityExceeded(capacity));
        }
        Ok(out)
    }
}

/// Splits the request target into host, optional port and path.
///
/// Absolute-form targets (`http://host:port/path`, the usual shape for proxy
/// requests) carry the authority themselves; origin-form targets (`/path`)
/// fall back to the `Host` header. No normalization or percent-decoding is
/// applied to the path.
fn split_target(
    target: &str,
    headers: &[(String, String)],
) -> Result<(Option<String>, Option<u16>, String), SchemaError> {
    if let Some(rest) = target.strip_prefix("http://") {
        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };
        let (host, port) = split_authority(authority)?;
        if host.is_empty() {
            return Err(SchemaError::Malformed("empty host in request target".into()));
        }
        return Ok((Some(host.to_string()), port, path.to_string()));
    }

    let host_header = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Host"))
        .map(|(_, v)| v.as_str());

    match host_header {
        Some(value) => {
            let (host, port) = split_authority(value.trim())?;
            let host = (!host.is_empty()).then(|| host.to_string());
            Ok((host, port, target.to_string()))
        }
        None => Ok((None, None, target.to_string())),
    }
}

fn split_authority(authority: &str) -> Result<(&str, Option<u16>), SchemaError> {
    match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| SchemaError::Malformed(format!("invalid port in {authority:?}")))?;
            Ok((host, Some(port)))
        }
        None => Ok((authority, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_origin_form_with_host_header() {
        let raw = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\nAccept: */*\r\n\r\n";
        let req = ParsedRequest::parse(raw).unwrap();

        assert_eq!(req.method, "GET");
        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.port, None);
        assert_eq!(req.path, "/index.html");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.header("host"), Some("example.com"));
    }

    #[test]
    fn parses_absolute_form_with_port() {
        let raw = b"GET http://example.com:8081/a/b?q=1 HTTP/1.0\r\n\r\n";
        let req = ParsedRequest::parse(raw).unwrap();

        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.port, Some(8081));
        assert_eq!(req.path, "/a/b?q=1");
        assert_eq!(req.version, "HTTP/1.0");
    }

    #[test]
    fn absolute_form_without_path_defaults_to_root() {
        let raw = b"GET http://example.com HTTP/1.1\r\n\r\n";
        let req = ParsedRequest::parse(raw).unwrap();

        assert_eq!(req.host.as_deref(), Some("example.com"));
        assert_eq!(req.path, "/");
    }

    #[test]
    fn missing_host_everywhere_yields_none() {
        let raw = b"GET /x HTTP/1.1\r\n\r\n";
        let req = ParsedRequest::parse(raw).unwrap();
        assert_eq!(req.host, None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(ParsedRequest::parse(b"\0\x01\x02 not http\r\n\r\n").is_err());
    }

    #[test]
    fn incomplete_head_is_an_error() {
        assert!(matches!(
            ParsedRequest::parse(b"GET / HTTP/1.1\r\nHost: a"),
            Err(SchemaError::Incomplete)
        ));
    }

    #[test]
    fn set_header_overwrites_in_place() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\nConnection: keep-alive\r\n\r\n";
        let mut req = ParsedRequest::parse(raw).unwrap();

        req.set_header("Connection", "close");
        req.set_header("X-New", "1");

        assert_eq!(req.header("connection"), Some("close"));
        assert_eq!(req.header("x-new"), Some("1"));
        // order preserved for pass-through headers
        assert_eq!(req.headers()[0].0, "Host");
        assert_eq!(req.headers()[1].0, "Connection");
    }

    #[test]
    fn unparse_headers_respects_capacity() {
        let raw = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let req = ParsedRequest::parse(raw).unwrap();

        let wire = req.unparse_headers(4096).unwrap();
        assert_eq!(wire, b"Host: example.com\r\n\r\n");

        assert!(matches!(
            req.unparse_headers(4),
            Err(SchemaError::CapacityExceeded(4))
        ));
    }
}
