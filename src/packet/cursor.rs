//! Forward-only frame reader.

/// Sequential reader over a frame. Bytes that have been handed out are never revisited, and
/// every read is bounds-checked against the frame before the position moves.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    frame: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(frame: &'a [u8]) -> Self {
        Self { frame, pos: 0 }
    }

    /// Absolute offset of the next unread byte.
    pub(crate) const fn position(&self) -> usize {
        self.pos
    }

    /// Consume the next `N` bytes as a fixed-size block.
    pub(crate) fn advance<const N: usize>(&mut self) -> Option<&'a [u8; N]> {
        let block = self.frame.get(self.pos..)?.first_chunk::<N>()?;
        self.pos += N;
        Some(block)
    }

    /// Step over `len` bytes without reading them.
    pub(crate) fn skip(&mut self, len: usize) -> Option<()> {
        let end = self.pos.checked_add(len)?;
        if end > self.frame.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }
}
