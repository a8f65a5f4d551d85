//! output sinks with a fixed capacity.

use core::fmt;

/// a `fmt::Write` over caller-owned bytes that refuses, rather than truncates, writes that do
/// not fit.
///
/// a write that would run past the end copies nothing, latches `overflowed`, and returns
/// `fmt::Error`; whatever was written before it stays intact.
#[derive(Debug)]
pub struct BoundedBuffer<'a> {
    buf: &'a mut [u8],
    len: usize,
    overflowed: bool,
}

impl<'a> BoundedBuffer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        BoundedBuffer { buf, len: 0, overflowed: false }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    pub fn as_str(&self) -> &str {
        // only whole `&str`s are ever copied in, so this is always valid.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    pub fn into_str(self) -> &'a str {
        let BoundedBuffer { buf, len, .. } = self;
        let buf: &'a [u8] = buf;
        core::str::from_utf8(&buf[..len]).unwrap_or("")
    }
}

impl<'a> fmt::Write for BoundedBuffer<'a> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use core::fmt::Write;

    use super::BoundedBuffer;

    #[test]
    fn test_bounded_buffer_refuses_overflow() {
        let mut bytes = [0u8; 8];
        let mut sink = BoundedBuffer::new(&mut bytes);
        assert!(sink.write_str("MOV ").is_ok());
        assert!(sink.write_str("r0, r1").is_err());
        assert!(sink.overflowed());
        assert_eq!(sink.as_str(), "MOV ");
        assert!(sink.write_str("r0").is_ok());
        assert_eq!(sink.len(), 6);
        assert_eq!(sink.capacity(), 8);
        assert_eq!(sink.into_str(), "MOV r0");
    }

    #[test]
    fn test_bounded_buffer_exact_fit() {
        let mut bytes = [0u8; 4];
        let mut sink = BoundedBuffer::new(&mut bytes);
        assert!(sink.is_empty());
        assert!(write!(sink, "{}", 1234).is_ok());
        assert!(!sink.overflowed());
        assert!(sink.write_str("5").is_err());
        assert_eq!(sink.into_str(), "1234");
    }
}
