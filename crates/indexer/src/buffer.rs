//! Per-worker batch buffer
//!
//! Fragments are appended to one contiguous byte buffer so a flush hands the
//! transport a single frozen `Bytes` without re-copying.

use std::fmt;

use bytes::{Bytes, BytesMut};
use contracts::{Fragment, Item};

/// Batch taken out of a buffer at flush time
pub struct Batch {
    /// Concatenated fragments, in submission order
    pub body: Bytes,
    /// Items, in the same order as their fragments
    pub items: Vec<Item>,
}

/// Ordered fragments plus the items they encode
///
/// Owned by exactly one worker.
#[derive(Default)]
pub struct Buffer {
    body: BytesMut,
    items: Vec<Item>,
    byte_len: usize,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("items", &self.items.len())
            .field("bytes", &self.byte_len)
            .finish()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one encoded item
    #[inline]
    pub fn push(&mut self, fragment: Fragment, item: Item) {
        self.body.extend_from_slice(fragment.as_bytes());
        self.byte_len += fragment.len();
        self.items.push(item);
        debug_assert_eq!(self.byte_len, self.body.len());
    }

    /// Running byte total of all held fragments
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take the buffered batch, leaving the buffer empty
    pub fn take(&mut self) -> Batch {
        self.byte_len = 0;
        Batch {
            body: self.body.split().freeze(),
            items: std::mem::take(&mut self.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_tracks_bytes_and_order() {
        let mut buffer = Buffer::new();
        buffer.push(Fragment::new(&b"aa\n"[..]), Item::delete("1"));
        buffer.push(Fragment::new(&b"bbbb\n"[..]), Item::delete("2"));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.byte_len(), 8);

        let batch = buffer.take();
        assert_eq!(&batch.body[..], b"aa\nbbbb\n");
        let ids: Vec<_> = batch
            .items
            .iter()
            .map(|i| i.document_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_take_resets() {
        let mut buffer = Buffer::new();
        buffer.push(Fragment::new(&b"x\n"[..]), Item::delete("1"));
        let _ = buffer.take();

        assert!(buffer.is_empty());
        assert_eq!(buffer.byte_len(), 0);

        buffer.push(Fragment::new(&b"y\n"[..]), Item::delete("2"));
        assert_eq!(&buffer.take().body[..], b"y\n");
    }
}
