//! Measure command implementation.

use crate::utils::{format_ratio, lzw_config, space_savings};
use oxires_core::{DiscardSink, SliceSource};
use oxires_lzw::LzwEncoder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// JSON output for a measurement.
#[derive(Debug, Serialize, Deserialize)]
struct MeasureJson {
    file: String,
    code_bits: u8,
    original_size: u64,
    compressed_size: u64,
    savings: f64,
    flushes: u32,
}

pub fn cmd_measure(input: &Path, bits: u8, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = lzw_config(bits)?;
    let data = fs::read(input)?;

    let mut encoder = LzwEncoder::new(config)?;
    let compressed = encoder.compress(
        SliceSource::new(&data),
        data.len(),
        DiscardSink::new(),
        usize::MAX,
    )?;

    let original = data.len() as u64;
    let compressed = compressed as u64;

    if json {
        let output = MeasureJson {
            file: input.display().to_string(),
            code_bits: config.code_bits,
            original_size: original,
            compressed_size: compressed,
            savings: space_savings(original, compressed),
            flushes: encoder.flush_count(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("File: {}", input.display());
    println!("Code width: {} bits", config.code_bits);
    println!("Original size: {} bytes", original);
    println!("Compressed size: {} bytes", compressed);
    println!("Space savings: {}", format_ratio(original, compressed));
    println!("Dictionary flushes: {}", encoder.flush_count());
    if compressed >= original {
        println!("Note: payload does not compress; store it raw");
    }

    Ok(())
}
