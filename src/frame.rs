//! Length-prefixed frame codec: `[u32 big-endian length][payload]`.
//!
//! Modeled on the teacher's `net::encrypted::{read_handshake_msg,
//! write_handshake_msg}` helpers, generalized from a 16-bit handshake-only
//! prefix to the 32-bit payload prefix the data plane uses, per spec.md §4.1.

use crate::error::FrameError;
use crate::packet::MAX_PACKET_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read exactly one frame: a 4-byte big-endian length followed by that many
/// payload bytes. Partial reads are retried transparently by `read_exact`.
///
/// Returns `FrameError::EndOfStream` if the stream is at EOF before any byte
/// of the length prefix is read, and `FrameError::Framing` for a zero-length,
/// oversize, or truncated frame.
pub async fn read_frame<R>(reader: &mut R) -> Result<Vec<u8>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(FrameError::EndOfStream);
        }
        Err(e) => return Err(FrameError::Io(e)),
    }

    let len = u32::from_be_bytes(len_bytes) as usize;
    if len == 0 {
        return Err(FrameError::Framing("zero-length frame"));
    }
    if len > MAX_PACKET_SIZE {
        return Err(FrameError::Framing("oversize frame"));
    }

    let mut payload = vec![0u8; len];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(|_| FrameError::Framing("truncated frame"))?;

    Ok(payload)
}

/// Write one frame: a 4-byte big-endian length followed by `payload`.
///
/// Callers on a shared connection must serialize calls to this function
/// (e.g. with a per-connection write mutex, per spec.md §4.4/§5) so that the
/// length prefix and payload are never interleaved with another writer's
/// frame.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > MAX_PACKET_SIZE {
        return Err(FrameError::Framing("oversize frame"));
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn roundtrip() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello world").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let payload = read_frame(&mut cursor).await.unwrap();
        assert_eq!(payload, b"hello world");
    }

    #[tokio::test]
    async fn zero_length_is_framing_error() {
        let mut cursor = Cursor::new(0u32.to_be_bytes().to_vec());
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[tokio::test]
    async fn max_size_frame_is_accepted() {
        let payload = vec![0u8; MAX_PACKET_SIZE];
        let mut buf = Vec::new();
        write_frame(&mut buf, &payload).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let got = read_frame(&mut cursor).await.unwrap();
        assert_eq!(got.len(), MAX_PACKET_SIZE);
    }

    #[tokio::test]
    async fn oversize_frame_on_write_is_rejected() {
        let payload = vec![0u8; MAX_PACKET_SIZE + 1];
        let mut buf = Vec::new();
        let err = write_frame(&mut buf, &payload).await.unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[tokio::test]
    async fn oversize_frame_on_read_is_rejected() {
        let mut buf = ((MAX_PACKET_SIZE + 1) as u32).to_be_bytes().to_vec();
        buf.extend(vec![0u8; MAX_PACKET_SIZE + 1]);
        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[tokio::test]
    async fn truncated_frame_is_framing_error() {
        let mut buf = 10u32.to_be_bytes().to_vec();
        buf.extend(vec![0u8; 3]); // declared 10 bytes, only 3 present
        let mut cursor = Cursor::new(buf);
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[tokio::test]
    async fn empty_stream_is_end_of_stream() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let err = read_frame(&mut cursor).await.unwrap_err();
        assert!(matches!(err, FrameError::EndOfStream));
    }
}
