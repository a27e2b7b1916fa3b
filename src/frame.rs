//! Length-prefixed frame transport.
//!
//! A frame is a 4-byte big-endian length followed by that many BRIO
//! bytes. There is no heartbeat and no version prefix; the peer closing
//! the stream is the only end-of-session signal.

use std::io::{ErrorKind, Read, Write};

use log::trace;

use crate::{Error, Result};

/// Read one frame, blocking until it is complete.
///
/// Returns `None` if the stream closes before either the length prefix or
/// the body is complete: end of session.
pub fn read_frame<R: Read>(r: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len = [0u8; 4];
    match r.read_exact(&mut len) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_be_bytes(len) as usize;
    let mut body = vec![0u8; len];
    match r.read_exact(&mut body) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    trace!("read frame of {len} bytes");
    Ok(Some(body))
}

/// Write one frame.
///
/// The length prefix and body go out as a single write, so a peer never
/// observes a prefix without the body behind it.
pub fn write_frame<W: Write>(w: &mut W, body: &[u8]) -> Result<()> {
    let len = u32::try_from(body.len()).map_err(|_| Error::EncodeUnsupported {
        what: format!("frame of {} bytes", body.len()),
    })?;
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(body);
    w.write_all(&frame)?;
    w.flush()?;
    trace!("wrote frame of {len} bytes");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"hello").unwrap();
        assert_eq!(buf, b"\x00\x00\x00\x05hello");
        let mut c = Cursor::new(buf);
        assert_eq!(read_frame(&mut c).unwrap(), Some(b"hello".to_vec()));
        assert_eq!(read_frame(&mut c).unwrap(), None);
    }

    #[test]
    fn empty_body() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();
        let mut c = Cursor::new(buf);
        assert_eq!(read_frame(&mut c).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn eof_mid_prefix() {
        let mut c = Cursor::new(vec![0x00, 0x00]);
        assert_eq!(read_frame(&mut c).unwrap(), None);
    }

    #[test]
    fn eof_mid_body() {
        let mut c = Cursor::new(vec![0x00, 0x00, 0x00, 0x05, b'h', b'i']);
        assert_eq!(read_frame(&mut c).unwrap(), None);
    }

    #[test]
    fn back_to_back_frames() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"one").unwrap();
        write_frame(&mut buf, b"two").unwrap();
        let mut c = Cursor::new(buf);
        assert_eq!(read_frame(&mut c).unwrap(), Some(b"one".to_vec()));
        assert_eq!(read_frame(&mut c).unwrap(), Some(b"two".to_vec()));
        assert_eq!(read_frame(&mut c).unwrap(), None);
    }
}
