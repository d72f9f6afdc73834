//! Expand command implementation.

use crate::utils::lzw_config;
use oxires_core::{BlockSink, BlockSource};
use oxires_lzw::LzwDecoder;
use std::fs::{self, File};
use std::path::Path;

/// Options for expanding a payload.
pub struct ExpandOptions {
    pub bits: u8,
    pub skip: usize,
    pub take: Option<usize>,
}

pub fn cmd_expand(
    input: &Path,
    output: &Path,
    options: &ExpandOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = lzw_config(options.bits)?;
    let compressed_len = fs::metadata(input)?.len();

    let mut decoder = LzwDecoder::new(config)?;
    let written = decoder.expand(
        BlockSource::new(File::open(input)?),
        BlockSink::new(File::create(output)?),
        options.skip,
        options.take,
    )?;

    println!("{} -> {}", input.display(), output.display());
    println!("  Compressed size: {} bytes", compressed_len);
    if options.skip > 0 || options.take.is_some() {
        println!("  Window: {}..{}", options.skip, options.skip + written);
    }
    println!("  Written: {} bytes", written);

    Ok(())
}
