//! Channel bracketing shared by the encoder and decoder.

use crate::error::Result;
use oxires_core::{ByteSink, ByteSource};

/// Open both channels, run `body`, then close both channels whatever
/// `body` returned.
///
/// The first error wins: a failure inside `body` is reported even if a
/// close also fails.
pub(crate) fn bracket<S, D, T>(
    source: &mut S,
    sink: &mut D,
    body: impl FnOnce(&mut S, &mut D) -> Result<T>,
) -> Result<T>
where
    S: ByteSource,
    D: ByteSink,
{
    source.open()?;
    if let Err(e) = sink.open() {
        let _ = source.close();
        return Err(e.into());
    }

    let result = body(source, sink);
    let source_closed = source.close();
    let sink_closed = sink.close();

    let value = result?;
    source_closed?;
    sink_closed?;
    Ok(value)
}
