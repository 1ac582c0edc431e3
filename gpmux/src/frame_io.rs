//! Reads and writes [`ControlFrame`]s off a live `TcpStream` half. Reads
//! the 5-byte header first, then exactly `length` payload bytes, so
//! multiple frames arriving in one underlying TCP read are handled
//! correctly (spec.md §4.1's decoding contract).

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use protocol::{ControlFrame, HEADER_LEN, WireError};

/// Read one frame, or `Ok(None)` on a clean EOF before any header bytes
/// arrived (the peer closed the connection).
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<ControlFrame>, WireError> {
    let mut header = [0u8; HEADER_LEN];
    match read_exact_or_eof(reader, &mut header).await? {
        false => return Ok(None),
        true => {}
    }

    let (frame_type, length) = ControlFrame::decode_header(&header)?;
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;

    Ok(Some(ControlFrame::new(frame_type, payload)))
}

/// Like `read_exact`, but returns `Ok(false)` instead of erroring if the
/// stream is closed before a single byte of `buf` is filled.
async fn read_exact_or_eof<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<bool, WireError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(WireError::Malformed("connection closed mid-frame-header"));
        }
        filled += n;
    }
    Ok(true)
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame: &ControlFrame,
) -> Result<(), WireError> {
    writer.write_all(&frame.encode()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::FrameType;

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let frame = ControlFrame::new(FrameType::Register, bytes::Bytes::from_static(b"alice"));
        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        let decoded = read_frame(&mut cursor).await.unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    #[tokio::test]
    async fn two_frames_in_one_buffer_are_both_read() {
        let first = ControlFrame::new(FrameType::Register, bytes::Bytes::from_static(b"a"));
        let second = ControlFrame::empty(FrameType::Done);
        let mut buf = Vec::new();
        write_frame(&mut buf, &first).await.unwrap();
        write_frame(&mut buf, &second).await.unwrap();

        let mut cursor = std::io::Cursor::new(buf);
        assert_eq!(read_frame(&mut cursor).await.unwrap().unwrap(), first);
        assert_eq!(read_frame(&mut cursor).await.unwrap().unwrap(), second);
        assert!(read_frame(&mut cursor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clean_eof_before_any_bytes_is_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_frame(&mut cursor).await.unwrap().is_none());
    }
}
