use tokio::io::{AsyncRead, AsyncReadExt};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Reads the request head from the client: bytes accumulate until the
/// `\r\n\r\n` terminator shows up, the buffer reaches `max_bytes`, or the
/// peer closes.
///
/// Returns `None` for a clean zero-byte close before any data arrived (the
/// client connected and went away, nothing to do). A close after partial data,
/// or a full buffer with no terminator, still returns the bytes read so far;
/// the parser decides whether they amount to a request.
pub async fn read_request_buffer<S>(
    stream: &mut S,
    max_bytes: usize,
) -> Result<Option<Vec<u8>>, std::io::Error>
where
    S: AsyncRead + Unpin,
{
    let mut buffer = Vec::with_capacity(max_bytes.min(1024));
    let mut chunk = [0u8; 512];

    loop {
        let remaining = max_bytes - buffer.len();
        if remaining == 0 {
            tracing::trace!(len = buffer.len(), "request buffer full without terminator");
            return Ok(Some(buffer));
        }

        let read_len = remaining.min(chunk.len());
        let n = stream.read(&mut chunk[..read_len]).await?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            tracing::trace!(len = buffer.len(), "client closed before header terminator");
            return Ok(Some(buffer));
        }

        buffer.extend_from_slice(&chunk[..n]);

        if contains_terminator(&buffer) {
            tracing::trace!(len = buffer.len(), "found end of headers");
            return Ok(Some(buffer));
        }
    }
}

fn contains_terminator(buffer: &[u8]) -> bool {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .any(|window| window == HEADER_TERMINATOR)
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;

    #[tokio::test]
    async fn reads_until_terminator() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: a\r\n\r\n")
            .await
            .unwrap();

        let buf = read_request_buffer(&mut server, 4096).await.unwrap();
        assert_eq!(buf.unwrap(), b"GET / HTTP/1.1\r\nHost: a\r\n\r\n");
    }

    #[tokio::test]
    async fn terminator_split_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(16);

        let writer = tokio::spawn(async move {
            client
                .write_all(b"GET / HTTP/1.1\r\nHost: example.com\r")
                .await
                .unwrap();
            client.write_all(b"\n\r\n").await.unwrap();
        });

        let buf = read_request_buffer(&mut server, 4096).await.unwrap();
        assert_eq!(buf.unwrap(), b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n");
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn clean_close_before_data_is_none() {
        let (client, mut server) = tokio::io::duplex(16);
        drop(client);

        let buf = read_request_buffer(&mut server, 4096).await.unwrap();
        assert!(buf.is_none());
    }

    #[tokio::test]
    async fn stops_at_max_bytes_without_terminator() {
        let (mut client, mut server) = tokio::io::duplex(8192);
        client.write_all(&[b'x'; 5000]).await.unwrap();

        let buf = read_request_buffer(&mut server, 4096)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(buf.len(), 4096);
    }
}
