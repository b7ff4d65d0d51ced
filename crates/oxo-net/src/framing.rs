//! Length-prefixed framing for TCP streams.
//!
//! Every message travels as one frame:
//!
//! ```text
//! +-------------------+--------------------+
//! | length (4 bytes)  |   payload          |
//! | u32 little-endian |   (length bytes)   |
//! +-------------------+--------------------+
//! ```
//!
//! The prefix encodes the payload size only; the 4 prefix bytes are not
//! counted. Zero-length frames are legal at this layer and left to the
//! payload codec to judge.

use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Limits for the framing layer.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum allowed payload size in bytes. Default: 64 KiB, far above
    /// the largest state push this protocol produces.
    pub max_payload_size: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 65_536,
        }
    }
}

/// Errors from reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload size exceeds the configured maximum.
    #[error("payload of {size} bytes exceeds the {max} byte limit")]
    PayloadTooLarge {
        /// Size declared by the peer (or requested by the caller).
        size: u32,
        /// The configured maximum.
        max: u32,
    },

    /// The peer closed the connection before a complete frame arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn map_closed(e: std::io::Error) -> FrameError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        FrameError::ConnectionClosed
    } else {
        FrameError::Io(e)
    }
}

/// Read one length-prefixed frame and return its payload.
///
/// Waits until the frame is complete. A clean close before or inside a frame
/// yields [`FrameError::ConnectionClosed`]. After a
/// [`FrameError::PayloadTooLarge`] the stream position is undefined; callers
/// should drop the connection.
pub async fn read_frame<R: AsyncReadExt + Unpin>(
    reader: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, FrameError> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix).await.map_err(map_closed)?;

    let len = u32::from_le_bytes(prefix);
    if len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: config.max_payload_size,
        });
    }

    let mut payload = vec![0u8; len as usize];
    if len > 0 {
        reader.read_exact(&mut payload).await.map_err(map_closed)?;
    }
    Ok(payload)
}

/// Write `payload` as one length-prefixed frame and flush.
pub async fn write_frame<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<(), FrameError> {
    let len = payload.len() as u32;
    if len > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: len,
            max: config.max_payload_size,
        });
    }

    writer.write_all(&len.to_le_bytes()).await?;
    if !payload.is_empty() {
        writer.write_all(payload).await?;
    }
    writer.flush().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let (mut client, mut server) = duplex(8192);
        let config = FrameConfig::default();
        let payload = br#"{"type":"startGame"}"#;

        write_frame(&mut client, payload, &config).await.unwrap();
        let received = read_frame(&mut server, &config).await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn test_frames_arrive_in_order_without_merging() {
        let (mut client, mut server) = duplex(8192);
        let config = FrameConfig::default();

        for payload in [b"one".as_slice(), b"two", b"three"] {
            write_frame(&mut client, payload, &config).await.unwrap();
        }
        for expected in [b"one".as_slice(), b"two", b"three"] {
            let received = read_frame(&mut server, &config).await.unwrap();
            assert_eq!(received, expected);
        }
    }

    #[tokio::test]
    async fn test_partial_reads_reassemble() {
        // A tiny duplex buffer forces the payload through in pieces.
        let (mut client, mut server) = duplex(8);
        let config = FrameConfig::default();
        let payload = b"a payload well beyond the buffer size";

        let writer_config = config.clone();
        let writer = tokio::spawn(async move {
            write_frame(&mut client, payload, &writer_config)
                .await
                .unwrap();
        });

        let received = read_frame(&mut server, &config).await.unwrap();
        writer.await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn test_oversized_prefix_rejected_on_read() {
        let (mut client, mut server) = duplex(8192);
        let config = FrameConfig {
            max_payload_size: 16,
        };

        client.write_all(&1024u32.to_le_bytes()).await.unwrap();
        client.flush().await.unwrap();

        let result = read_frame(&mut server, &config).await;
        assert!(matches!(
            result,
            Err(FrameError::PayloadTooLarge { size: 1024, max: 16 })
        ));
    }

    #[tokio::test]
    async fn test_oversized_payload_rejected_on_write() {
        let (mut client, _server) = duplex(8192);
        let config = FrameConfig {
            max_payload_size: 16,
        };

        let result = write_frame(&mut client, &[0u8; 64], &config).await;
        assert!(matches!(result, Err(FrameError::PayloadTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_zero_length_frame_is_legal() {
        let (mut client, mut server) = duplex(8192);
        let config = FrameConfig::default();

        write_frame(&mut client, &[], &config).await.unwrap();
        let received = read_frame(&mut server, &config).await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_closed_connection_detected() {
        let (client, mut server) = duplex(8192);
        drop(client);

        let result = read_frame(&mut server, &FrameConfig::default()).await;
        assert!(matches!(result, Err(FrameError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_close_mid_frame_detected() {
        let (mut client, mut server) = duplex(8192);
        // Announce 10 bytes, deliver 3, then hang up.
        client.write_all(&10u32.to_le_bytes()).await.unwrap();
        client.write_all(b"abc").await.unwrap();
        client.flush().await.unwrap();
        drop(client);

        let result = read_frame(&mut server, &FrameConfig::default()).await;
        assert!(matches!(result, Err(FrameError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_prefix_is_little_endian() {
        let (mut client, mut server) = duplex(8192);

        client.write_all(&5u32.to_le_bytes()).await.unwrap();
        client.write_all(b"hello").await.unwrap();
        client.flush().await.unwrap();

        let received = read_frame(&mut server, &FrameConfig::default())
            .await
            .unwrap();
        assert_eq!(received, b"hello");
    }
}
