//! Binary payload targets: byte arrays, character arrays and streams.
//!
//! Array targets clone the row's buffer. Stream targets drain the row's stream
//! into an owned [`ByteStream`], so the row (and whatever produced its stream)
//! can be dropped without affecting the result.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::{
    Value,
    coerce::{ConversionError, FromCell},
    descriptor::{BinaryKind, TargetDescriptor},
    value::StreamSource,
};

impl FromCell for Vec<u8> {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::binary(BinaryKind::Bytes)
    }

    fn null_value() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bytes(bytes) => Ok(bytes.clone()),
            other => Err(ConversionError::mismatch(&Self::descriptor(), other)),
        }
    }
}

impl FromCell for Vec<char> {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::binary(BinaryKind::Chars)
    }

    fn null_value() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Chars(chars) => Ok(chars.clone()),
            other => Err(ConversionError::mismatch(&Self::descriptor(), other)),
        }
    }
}

/// Owned, seekable in-memory copy of a stream cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteStream {
    inner: Cursor<Vec<u8>>,
}

impl ByteStream {
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self {
            inner: Cursor::new(bytes),
        }
    }

    #[must_use]
    pub fn get_ref(&self) -> &[u8] {
        self.inner.get_ref()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.get_ref().is_empty()
    }

    #[must_use]
    pub const fn position(&self) -> u64 {
        self.inner.position()
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// Copies the whole of `source` and leaves its position where it was.
///
/// Reading always starts from the beginning so that materializing the same
/// row twice yields the same bytes.
fn drain(source: &mut dyn StreamSource) -> io::Result<Vec<u8>> {
    let position = source.stream_position()?;
    source.rewind()?;

    let mut bytes = Vec::new();
    let read = source.read_to_end(&mut bytes);
    source.seek(SeekFrom::Start(position))?;
    read?;

    log::trace!("drain: copied {} stream bytes", bytes.len());

    Ok(bytes)
}

impl FromCell for ByteStream {
    fn descriptor() -> TargetDescriptor {
        TargetDescriptor::binary(BinaryKind::Stream)
    }

    fn null_value() -> Self {
        Self::default()
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Stream(handle) => Ok(Self::new(handle.with_source(drain)?)),
            other => Err(ConversionError::mismatch(&Self::descriptor(), other)),
        }
    }
}
