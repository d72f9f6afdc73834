//! OxiRes CLI - resource file tooling
//!
//! Compresses, expands and measures LZW resource payloads, and packs files
//! into a resource file.

mod commands;
mod utils;

use clap::{Parser, Subcommand};
use commands::{
    CompressOptions, ExpandOptions, UnpackOptions, cmd_compress, cmd_expand, cmd_measure, cmd_pack,
    cmd_unpack,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxires")]
#[command(author, version, about = "Resource file tooling - LZW payloads and packing")]
#[command(long_about = "
OxiRes compresses resource payloads with fixed-width LZW and packs them
into resource files.

Examples:
  oxires compress level.map level.lzw
  oxires expand level.lzw level.map
  oxires expand level.lzw part.bin --skip 1024 --take 256
  oxires measure palette.bin --json
  oxires pack game.res intro.txt title.bmp
  oxires unpack game.res --offset 8 --size 4096 --lzw -o title.bmp
")]
struct Cli {
    /// Show log output (honours RUST_LOG, defaults to info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file into an LZW payload
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output payload
        output: PathBuf,

        /// Code width in bits (9-16)
        #[arg(short, long, default_value_t = 14)]
        bits: u8,

        /// Fail if the payload would exceed this many bytes
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Expand an LZW payload
    #[command(alias = "x")]
    Expand {
        /// Payload to expand
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Code width in bits (9-16)
        #[arg(short, long, default_value_t = 14)]
        bits: u8,

        /// Discard this many leading bytes of output
        #[arg(short, long, default_value_t = 0)]
        skip: usize,

        /// Write at most this many bytes
        #[arg(short, long)]
        take: Option<usize>,
    },

    /// Report the compressed size of a file without writing it
    #[command(alias = "m")]
    Measure {
        /// File to measure
        input: PathBuf,

        /// Code width in bits (9-16)
        #[arg(short, long, default_value_t = 14)]
        bits: u8,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,
    },

    /// Pack files into a resource file
    #[command(alias = "p")]
    Pack {
        /// Resource file to create
        output: PathBuf,

        /// Files to pack, one resource each
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Id of the first resource
        #[arg(long, default_value_t = 3)]
        first_id: u16,

        /// Store payloads without compression
        #[arg(long)]
        raw: bool,

        /// Print the descriptor table as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Extract one resource from a resource file
    #[command(alias = "u")]
    Unpack {
        /// Resource file
        pack: PathBuf,

        /// Byte offset of the payload
        #[arg(long)]
        offset: u32,

        /// Materialized size of the resource
        #[arg(long)]
        size: u32,

        /// Payload is LZW-compressed
        #[arg(long)]
        lzw: bool,

        /// Payload starts with a compound reference table
        #[arg(long)]
        compound: bool,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(cli: &Cli) {
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            bits,
            max,
        } => cmd_compress(&input, &output, &CompressOptions { bits, max }),
        Commands::Expand {
            input,
            output,
            bits,
            skip,
            take,
        } => cmd_expand(&input, &output, &ExpandOptions { bits, skip, take }),
        Commands::Measure { input, bits, json } => cmd_measure(&input, bits, json),
        Commands::Pack {
            output,
            files,
            first_id,
            raw,
            json,
        } => cmd_pack(&output, &files, first_id, raw, json),
        Commands::Unpack {
            pack,
            offset,
            size,
            lzw,
            compound,
            output,
        } => cmd_unpack(
            &pack,
            &UnpackOptions {
                offset,
                size,
                lzw,
                compound,
            },
            output.as_deref(),
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
