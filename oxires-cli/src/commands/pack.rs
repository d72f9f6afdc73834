//! Pack command implementation.

use crate::utils::{PACK_MAGIC, format_ratio};
use oxires_store::{PayloadWriter, ResFlags, ResourceId};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSON serializable descriptor of a packed resource.
#[derive(Debug, Serialize, Deserialize)]
struct ResourceJson {
    id: u16,
    name: String,
    offset: u32,
    size: u32,
    stored_size: usize,
    lzw: bool,
}

/// JSON output for a packed resource file.
#[derive(Debug, Serialize, Deserialize)]
struct PackJson {
    file: String,
    resources: Vec<ResourceJson>,
}

pub fn cmd_pack(
    output: &Path,
    files: &[PathBuf],
    first_id: u16,
    raw: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !ResourceId(first_id).is_resource() {
        return Err(format!("first id must be at least {}", ResourceId::FIRST.0).into());
    }
    let last_id = usize::from(first_id) + files.len().saturating_sub(1);
    if last_id > usize::from(u16::MAX) {
        return Err(format!("{} files do not fit above id {}", files.len(), first_id).into());
    }

    let flags = if raw { ResFlags::NONE } else { ResFlags::LZW };

    let mut file = BufWriter::new(File::create(output)?);
    file.write_all(PACK_MAGIC)?;

    let mut writer = PayloadWriter::new(file, 0);
    let mut resources = Vec::with_capacity(files.len());
    for (id, path) in (first_id..=u16::MAX).zip(files) {
        let data = fs::read(path)?;
        let packed = writer.write(ResourceId(id), &data, flags, 0)?;
        resources.push(ResourceJson {
            id,
            name: path.display().to_string(),
            offset: packed.info.offset,
            size: packed.info.size,
            stored_size: packed.stored_size,
            lzw: packed.info.flags.contains(ResFlags::LZW),
        });
    }
    writer.into_inner()?.flush()?;

    if json {
        let output = PackJson {
            file: output.display().to_string(),
            resources,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>7}  Name",
        "Id", "Offset", "Size", "Stored", "Ratio"
    );
    println!("{}", "-".repeat(60));

    let mut total_size = 0u64;
    let mut total_stored = 0u64;
    for res in &resources {
        println!(
            "{:>6} {:>10} {:>10} {:>10} {:>7}  {}{}",
            ResourceId(res.id),
            res.offset,
            res.size,
            res.stored_size,
            format_ratio(u64::from(res.size), res.stored_size as u64),
            res.name,
            if res.lzw { "" } else { " (raw)" }
        );
        total_size += u64::from(res.size);
        total_stored += res.stored_size as u64;
    }

    println!("{}", "-".repeat(60));
    println!(
        "{:>6} {:>10} {:>10} {:>10} {:>7}  {} resources -> {}",
        "",
        "",
        total_size,
        total_stored,
        format_ratio(total_size, total_stored),
        resources.len(),
        output.display()
    );

    Ok(())
}
