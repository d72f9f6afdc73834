//! Core traits for byte channels.
//!
//! The LZW codec never touches memory, files or sockets directly. It pulls
//! bytes from a [`ByteSource`] and pushes bytes into a [`ByteSink`]. For
//! compression the source yields uncompressed bytes and the sink receives
//! compressed bytes; for expansion the roles are reversed.
//!
//! Each codec call brackets its work with exactly one `open` and one `close`
//! on both channels, in that order and never nested. `close` is called on
//! every exit path once `open` succeeded, including aborts.

use crate::error::Result;

/// A source of bytes for one codec call.
///
/// The amount of data pulled is controlled by the caller of the codec
/// (compression is told the input length, expansion stops at the end code),
/// so a source only has to report [`OxiResError::UnexpectedEof`] when it is
/// asked for more than it has.
///
/// [`OxiResError::UnexpectedEof`]: crate::error::OxiResError::UnexpectedEof
pub trait ByteSource {
    /// Begin a codec call. Sources rewind to their starting location here.
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Get the next byte.
    fn next_byte(&mut self) -> Result<u8>;

    /// End a codec call.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A destination of bytes for one codec call.
pub trait ByteSink {
    /// Begin a codec call.
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    /// Put the next byte.
    fn put_byte(&mut self, byte: u8) -> Result<()>;

    /// End a codec call. Buffered sinks flush here.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn next_byte(&mut self) -> Result<u8> {
        (**self).next_byte()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn next_byte(&mut self) -> Result<u8> {
        (**self).next_byte()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn put_byte(&mut self, byte: u8) -> Result<()> {
        (**self).put_byte(byte)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

impl<S: ByteSink + ?Sized> ByteSink for Box<S> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn put_byte(&mut self, byte: u8) -> Result<()> {
        (**self).put_byte(byte)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
