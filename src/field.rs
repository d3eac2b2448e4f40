//! Header field representation and the decode listener.

use std::fmt;

/// An HTTP header field (name-value pair) with static storage.
///
/// Used for the entries of the QPACK static table. Transient fields
/// produced during decoding are delivered to a [`HeaderHandler`] as
/// borrowed slices instead.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub name: &'static [u8],
    pub value: &'static [u8],
}

impl HeaderField {
    /// Combined length of name and value, for callers doing header-size
    /// accounting. The codec itself does not enforce it.
    pub fn len(&self) -> usize {
        self.name.len() + self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

impl fmt::Debug for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HeaderField({:?}: {:?})",
            String::from_utf8_lossy(self.name),
            String::from_utf8_lossy(self.value)
        )
    }
}

/// Listener invoked by the decoder once per completed header field.
///
/// The `name` and `value` slices borrow the decoder's internal buffers and
/// are valid only for the duration of the call; implementations that keep
/// the data must copy it.
pub trait HeaderHandler {
    /// Both name and value come from the static table at `index`.
    fn on_static_indexed(&mut self, index: usize);

    /// Name comes from the static table at `index`; the value was a
    /// literal string.
    fn on_static_indexed_value(&mut self, index: usize, value: &[u8]);

    /// Both name and value were literal strings.
    fn on_header(&mut self, name: &[u8], value: &[u8]);
}
