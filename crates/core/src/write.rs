use crate::{Error, Result};
use serde_json::json;
use stac::{IntoGeoparquet, Item, ItemCollection, geoparquet::Compression};
use std::{fs::File, path::Path};

/// The asset key used when registering the output on a STAC collection.
pub(crate) const ASSET_KEY: &str = "geoparquet-items";

/// Writes items to `destination` as stac-geoparquet.
///
/// The full item sequence is buffered in memory and handed to the encoder in
/// one go. An existing file at `destination` is overwritten. Returns
/// [Error::NoItems], without creating the destination file, if `items` is
/// empty.
///
/// # Examples
///
/// ```no_run
/// let item: stac::Item = serde_json::from_slice(
///     &std::fs::read("data/items/a.json").unwrap()
/// ).unwrap();
/// stac_geoparquet_items::write(vec![item], "items.parquet", None).unwrap();
/// ```
pub fn write(
    items: Vec<Item>,
    destination: impl AsRef<Path>,
    compression: Option<Compression>,
) -> Result<()> {
    let destination = destination.as_ref();
    if items.is_empty() {
        return Err(Error::NoItems);
    }
    tracing::info!("writing {} items to {}", items.len(), destination.display());
    let file = File::create(destination).map_err(|error| Error::Write {
        path: destination.to_path_buf(),
        error,
    })?;
    let item_collection = ItemCollection::from(items);
    item_collection.into_geoparquet_writer(file, compression)?;
    Ok(())
}

/// Registers a stac-geoparquet file as an asset on a STAC collection.
///
/// The collection file at `collection` is rewritten in place with a
/// `geoparquet-items` asset pointing at `destination`. The asset href is made
/// relative to the collection's directory when the destination lies under it.
pub fn add_geoparquet_asset(
    collection: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<()> {
    let path = collection.as_ref();
    let destination = destination.as_ref();
    let contents = std::fs::read(path)?;
    let mut value: serde_json::Value =
        serde_json::from_slice(&contents).map_err(|error| Error::Parse {
            href: path.to_string_lossy().into_owned(),
            error,
        })?;
    let object = value
        .as_object_mut()
        .filter(|object| {
            object.get("type").and_then(|r#type| r#type.as_str()) == Some("Collection")
        })
        .ok_or_else(|| Error::NotACollection(path.to_string_lossy().into_owned()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let href = destination
        .strip_prefix(base)
        .unwrap_or(destination)
        .to_string_lossy()
        .into_owned();
    let assets = object
        .entry("assets")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| Error::NotACollection(path.to_string_lossy().into_owned()))?;
    let _ = assets.insert(
        ASSET_KEY.to_string(),
        json!({
            "href": href,
            "type": "application/x-parquet",
            "roles": ["stac-items"],
            "title": "GeoParquet STAC Items",
        }),
    );
    let file = File::create(path).map_err(|error| Error::Write {
        path: path.to_path_buf(),
        error,
    })?;
    serde_json::to_writer_pretty(file, &value)?;
    tracing::info!("added a {ASSET_KEY} asset to {}", path.display());
    Ok(())
}
