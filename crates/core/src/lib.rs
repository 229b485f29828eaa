//! Create [stac-geoparquet](https://github.com/stac-utils/stac-geoparquet)
//! from STAC items.
//!
//! Items come from a [Source]: either a STAC API items endpoint, whose pages
//! are fetched one at a time by following `next` links, or a local directory
//! of STAC item files. The resolved items are handed off to
//! [stac](https://crates.io/crates/stac) for geoparquet encoding, so schema
//! inference, geometry encoding, and parquet serialization are all external
//! concerns.
//!
//! # Examples
//!
//! ```no_run
//! use stac_geoparquet_items::{Options, Source};
//!
//! let source: Source = "data/items".parse().unwrap();
//! let items = source.resolve(&Options::default()).unwrap();
//! stac_geoparquet_items::write(items, "items.parquet", None).unwrap();
//! ```

mod error;
mod source;
mod write;

pub use {
    error::Error,
    source::{Options, Page, Pages, Source},
    write::{add_geoparquet_asset, write},
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}
