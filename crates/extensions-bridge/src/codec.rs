//! Length-prefixed framing.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::{BridgeError, BridgeMessage};

/// Largest message the browser accepts from a native host.
pub const MAX_OUTGOING_LEN: usize = 1024 * 1024;

/// Largest message the browser sends to a native host.
pub const MAX_INCOMING_LEN: usize = 64 * 1024 * 1024;

/// Read one frame body.
///
/// Returns `None` when the stream ends before any byte of the length prefix,
/// which is how the extension signals shutdown. Ending anywhere later is
/// [`BridgeError::Truncated`].
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Vec<u8>>, BridgeError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; 4];
    let mut filled = 0;
    while filled < prefix.len() {
        let n = reader.read(&mut prefix[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(None)
            } else {
                Err(BridgeError::Truncated)
            };
        }
        filled += n;
    }

    let len = u32::from_ne_bytes(prefix) as usize;
    if len > MAX_INCOMING_LEN {
        return Err(BridgeError::FrameTooLarge {
            len,
            limit: MAX_INCOMING_LEN,
        });
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    trace!(len, "read frame");
    Ok(Some(body))
}

/// Serialize `message` and write it as one frame, then flush.
pub async fn write_message<W>(writer: &mut W, message: &BridgeMessage) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    let body = serde_json::to_vec(message).map_err(|err| BridgeError::Encode(err.to_string()))?;
    write_frame(writer, &body).await
}

pub(crate) async fn write_frame<W>(writer: &mut W, body: &[u8]) -> Result<(), BridgeError>
where
    W: AsyncWrite + Unpin,
{
    if body.len() > MAX_OUTGOING_LEN {
        return Err(BridgeError::FrameTooLarge {
            len: body.len(),
            limit: MAX_OUTGOING_LEN,
        });
    }
    let len = body.len() as u32;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(body).await?;
    writer.flush().await?;
    trace!(len, "wrote frame");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut bytes = (body.len() as u32).to_ne_bytes().to_vec();
        bytes.extend_from_slice(body);
        bytes
    }

    #[tokio::test]
    async fn success_frame_is_twenty_bytes() {
        let mut out = Vec::new();
        let message = BridgeMessage {
            status: Status::Success,
            stats: None,
            message: None,
        };
        write_message(&mut out, &message).await.unwrap();
        assert_eq!(&out[..4], &20u32.to_ne_bytes());
        assert_eq!(&out[4..], br#"{"status":"success"}"#);
    }

    #[tokio::test]
    async fn eof_before_prefix_is_clean() {
        let mut input: &[u8] = &[];
        assert_eq!(read_frame(&mut input).await.unwrap(), None);
    }

    #[tokio::test]
    async fn partial_prefix_is_truncated() {
        let mut input: &[u8] = &[3, 0];
        assert_eq!(read_frame(&mut input).await, Err(BridgeError::Truncated));
    }

    #[tokio::test]
    async fn short_body_is_truncated() {
        let mut bytes = frame(b"{}");
        bytes.truncate(5);
        let mut input = bytes.as_slice();
        assert_eq!(read_frame(&mut input).await, Err(BridgeError::Truncated));
    }

    #[tokio::test]
    async fn reads_consecutive_frames() {
        let mut bytes = frame(br#"{"a":1}"#);
        bytes.extend(frame(b"[]"));
        let mut input = bytes.as_slice();
        assert_eq!(read_frame(&mut input).await.unwrap().unwrap(), br#"{"a":1}"#);
        assert_eq!(read_frame(&mut input).await.unwrap().unwrap(), b"[]");
        assert_eq!(read_frame(&mut input).await.unwrap(), None);
    }

    #[tokio::test]
    async fn oversized_outgoing_frame_is_rejected() {
        let mut out = Vec::new();
        let body = vec![b'x'; MAX_OUTGOING_LEN + 1];
        let err = write_frame(&mut out, &body).await.unwrap_err();
        assert!(matches!(err, BridgeError::FrameTooLarge { .. }));
        assert!(out.is_empty());
    }
}
