use time::OffsetDateTime;
use time::macros::format_description;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::config::SERVER_TOKEN;

/// Writes one of the fixed error pages to the client.
///
/// The HTML bodies and their Content-Length values are wire-stable: existing
/// clients and test vectors depend on the exact byte counts, embedded
/// newlines included. Unknown status codes are a programming error and write
/// nothing.
pub async fn send_error_response<S>(stream: &mut S, status_code: u16) -> std::io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let Some((reason, body)) = error_page(status_code) else {
        tracing::warn!(status_code, "no error page for status code");
        return Ok(());
    };

    let response = format!(
        "HTTP/1.1 {status_code} {reason}\r\n\
         Content-Length: {length}\r\n\
         Connection: keep-alive\r\n\
         Content-Type: text/html\r\n\
         Date: {date}\r\n\
         Server: {server}\r\n\
         \r\n\
         {body}",
        length = body.len(),
        date = http_date(),
        server = SERVER_TOKEN,
    );

    tracing::debug!(status_code, reason, "sending error response");
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

fn error_page(status_code: u16) -> Option<(&'static str, &'static str)> {
    match status_code {
        400 => Some((
            "Bad Request",
            "<HTML><HEAD><TITLE>400 Bad Request</TITLE></HEAD>\n<BODY><H1>400 Bad Request</H1>\n</BODY></HTML>",
        )),
        403 => Some((
            "Forbidden",
            "<HTML><HEAD><TITLE>403 Forbidden</TITLE></HEAD>\n<BODY><H1>403 Forbidden</H1><br>Permission Denied\n</BODY></HTML>",
        )),
        404 => Some((
            "Not Found",
            "<HTML><HEAD><TITLE>404 Not Found</TITLE></HEAD>\n<BODY><H1>404 Not Found</H1>\n</BODY></HTML>",
        )),
        500 => Some((
            "Internal Server Error",
            "<HTML><HEAD><TITLE>500 Internal Server Error</TITLE></HEAD>\n<BODY><H1>500 Internal Server Error</H1>\n</BODY></HTML>",
        )),
        501 => Some((
            "Not Implemented",
            "<HTML><HEAD><TITLE>501 Not Implemented</TITLE></HEAD>\n<BODY><H1>501 Not Implemented</H1>\n</BODY></HTML>",
        )),
        505 => Some((
            "HTTP Version Not Supported",
            "<HTML><HEAD><TITLE>505 HTTP Version Not Supported</TITLE></HEAD>\n<BODY><H1>505 HTTP Version Not Supported</H1>\n</BODY></HTML>",
        )),
        _ => None,
    }
}

/// RFC-1123 date, e.g. `Sat, 29 Aug 2026 14:03:12 GMT`.
fn http_date() -> String {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );

    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_lengths_match_the_wire_contract() {
        let expected = [
            (400, 95),
            (403, 112),
            (404, 91),
            (500, 115),
            (501, 103),
            (505, 125),
        ];
        for (status, length) in expected {
            let (_, body) = error_page(status).unwrap();
            assert_eq!(body.len(), length, "status {status}");
        }
    }

    #[test]
    fn unknown_status_has_no_page() {
        assert!(error_page(200).is_none());
        assert!(error_page(418).is_none());
    }

    #[tokio::test]
    async fn response_head_carries_the_fixed_headers() {
        let mut out = Vec::new();
        send_error_response(&mut out, 501).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
        assert!(text.contains("Content-Length: 103\r\n"));
        assert!(text.contains("Connection: keep-alive\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("\r\nDate: "));
        assert!(text.contains(" GMT\r\n"));
        assert!(text.contains("\r\nServer: caching-proxy/"));
        assert!(text.ends_with("</BODY></HTML>"));
    }

    #[test]
    fn http_date_is_rfc1123_shaped() {
        let date = http_date();
        assert_eq!(date.len(), "Sat, 29 Aug 2026 14:03:12 GMT".len());
        assert!(date.ends_with(" GMT"));
        assert_eq!(&date[3..5], ", ");
    }
}
