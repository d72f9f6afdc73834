//! Unpack command implementation.

use oxires_store::{ResFlags, ResourceId, ResourceInfo, ResourceStore};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

/// Where the resource lives and how it is stored.
pub struct UnpackOptions {
    pub offset: u32,
    pub size: u32,
    pub lzw: bool,
    pub compound: bool,
}

pub fn cmd_unpack(
    pack: &Path,
    options: &UnpackOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut flags = ResFlags::NONE;
    if options.lzw {
        flags.insert(ResFlags::LZW);
    }
    if options.compound {
        flags.insert(ResFlags::COMPOUND);
    }

    let mut store = ResourceStore::new();
    store.attach_file(0, BufReader::new(File::open(pack)?));
    store.define(
        ResourceId::FIRST,
        ResourceInfo {
            size: options.size,
            offset: options.offset,
            file_num: 0,
            flags,
            type_tag: 0,
        },
    )?;
    let data = store.get(ResourceId::FIRST)?;

    match output {
        Some(path) => {
            File::create(path)?.write_all(data)?;
            eprintln!("Unpacked {} bytes to {}", data.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
