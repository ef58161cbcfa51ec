use alloy_rlp::{Encodable, Header};

/// Incrementally built RLP list.
#[derive(Debug, Default)]
pub(crate) struct RlpList {
    payload: Vec<u8>,
}

impl RlpList {
    pub(crate) const fn new() -> Self {
        Self {
            payload: Vec::new(),
        }
    }

    /// Append an item using its canonical encoding. Integers are written as
    /// minimal big-endian strings, zero as the empty string.
    pub(crate) fn push<T: Encodable + ?Sized>(&mut self, item: &T) -> &mut Self {
        item.encode(&mut self.payload);
        self
    }

    /// Append a byte string.
    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        bytes.encode(&mut self.payload);
        self
    }

    /// Append a nested list of byte strings.
    pub(crate) fn push_bytes_list<'a>(
        &mut self,
        items: impl IntoIterator<Item = &'a [u8]>,
    ) -> &mut Self {
        let mut nested = Self::new();
        for item in items {
            nested.push_bytes(item);
        }
        self.payload.extend_from_slice(&nested.finish());
        self
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        let header = Header {
            list: true,
            payload_length: self.payload.len(),
        };
        let mut out = Vec::with_capacity(header.length() + self.payload.len());
        header.encode(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}
