//! Compress command implementation.

use crate::utils::{format_ratio, lzw_config};
use oxires_core::{BlockSink, BlockSource};
use oxires_lzw::LzwEncoder;
use std::fs::{self, File};
use std::path::Path;

/// Options for compressing a file.
pub struct CompressOptions {
    pub bits: u8,
    pub max: Option<usize>,
}

pub fn cmd_compress(
    input: &Path,
    output: &Path,
    options: &CompressOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = lzw_config(options.bits)?;
    let source_len = usize::try_from(fs::metadata(input)?.len())?;

    let mut encoder = LzwEncoder::new(config)?;
    let result = encoder.compress(
        BlockSource::new(File::open(input)?),
        source_len,
        BlockSink::new(File::create(output)?),
        options.max.unwrap_or(usize::MAX),
    );

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            // Leave no truncated payload behind
            let _ = fs::remove_file(output);
            return Err(e.into());
        }
    };

    println!("{} -> {}", input.display(), output.display());
    println!("  Code width: {} bits", config.code_bits);
    println!("  Original size: {} bytes", source_len);
    println!(
        "  Compressed size: {} bytes ({})",
        written,
        format_ratio(source_len as u64, written as u64)
    );
    if encoder.flush_count() > 0 {
        println!("  Dictionary flushes: {}", encoder.flush_count());
    }

    Ok(())
}
