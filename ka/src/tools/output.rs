//! Size-capped output buffer shared by the tools

/// Maximum bytes any tool returns or reads
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Appended when output was cut at the cap
pub const TRUNCATION_NOTICE: &str = "\n... truncated due to output size limit ...";

/// Byte buffer that keeps at most `limit` bytes and remembers overflow
#[derive(Debug)]
pub struct CappedBuffer {
    buf: Vec<u8>,
    limit: usize,
    truncated: bool,
}

impl CappedBuffer {
    pub fn new(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            truncated: false,
        }
    }

    /// Append bytes, dropping whatever exceeds the limit
    pub fn push(&mut self, bytes: &[u8]) {
        let room = self.limit.saturating_sub(self.buf.len());
        if bytes.len() > room {
            self.truncated = true;
        }
        self.buf.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Contents as text (invalid UTF-8 replaced)
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}
