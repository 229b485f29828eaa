// The verbosity stuff is cribbed from https://github.com/clap-rs/clap-verbosity-flag/blob/c621a6a8a7c0b6df8f1464a985a5d076b4915693/src/lib.rs and updated for tracing

#![deny(unused_crate_dependencies)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use stac::geoparquet::Compression;
use stac_geoparquet_items::{Options, Source};
use tracing::metadata::Level;

/// stac-geoparquet-items: create stac-geoparquet from STAC items
#[derive(Debug, Parser)]
pub struct GeoparquetItems {
    #[command(subcommand)]
    command: Command,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::verbose_help(),
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::quiet_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

/// A stac-geoparquet-items subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates a stac-geoparquet file from STAC items.
    Create {
        /// The source of the items.
        ///
        /// Either the url of a STAC API items endpoint, or a directory of
        /// STAC item files.
        source: String,

        /// The path of the output stac-geoparquet file.
        destination: String,

        /// Recurse into subdirectories when the source is a directory.
        #[arg(short = 'r', long, default_value_t = false)]
        recursive: bool,

        /// The page size to request from a STAC API source.
        ///
        /// Sent as the `limit` query parameter. If not provided, the server's
        /// default page size is used.
        #[arg(long = "page-size")]
        page_size: Option<usize>,

        /// Adds the output file as an asset to the STAC Collection at the given path.
        #[arg(long = "collection")]
        collection: Option<String>,

        /// The parquet compression to use.
        ///
        /// Possible values (default: the encoder's default):
        ///
        /// - uncompressed: No compression
        /// - snappy:       Snappy compression
        /// - gzip(n):      Gzip compression
        /// - brotli(n):    Brotli compression
        /// - lz4-raw:      LZ4 compression
        /// - zstd(n):      ZSTD compression
        ///
        /// Some of the compression values have a level, specified as `(n)`. This level should be an integer.
        #[arg(long = "parquet-compression", verbatim_doc_comment)]
        parquet_compression: Option<Compression>,
    },
}

#[derive(Copy, Clone, Debug, Default)]
struct ErrorLevel;

impl GeoparquetItems {
    /// Runs this command.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the
    /// caller is setting up the appropriate logging.
    pub fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_max_level(self.log_level())
                .init();
        }
        match self.command {
            Command::Create {
                ref source,
                ref destination,
                recursive,
                page_size,
                ref collection,
                parquet_compression,
            } => {
                let source: Source = source.parse()?;
                let options = Options {
                    recursive,
                    page_size,
                };
                let items = source.resolve(&options)?;
                tracing::info!("resolved {} items from {source}", items.len());
                stac_geoparquet_items::write(items, destination, parquet_compression)?;
                if let Some(collection) = collection {
                    stac_geoparquet_items::add_geoparquet_asset(collection, destination)?;
                }
                Ok(())
            }
        }
    }

    /// Returns the log level as set by the `-v` and `-q` flags.
    pub fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    fn verbosity(&self) -> i8 {
        level_value(ErrorLevel::default_level()) - (self.quiet as i8) + (self.verbose as i8)
    }
}

impl ErrorLevel {
    fn default_level() -> Option<Level> {
        Some(Level::ERROR)
    }

    fn verbose_help() -> Option<&'static str> {
        Some("Increase verbosity")
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Decrease verbosity")
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

#[cfg(test)]
use {assert_cmd as _, rstest as _, serde_json as _, tempfile as _};
