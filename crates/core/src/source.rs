use crate::{Error, Result};
use serde::Deserialize;
use stac::{Item, Link};
use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};
use url::Url;
use walkdir::WalkDir;

/// File names that hold STAC catalogs and collections, not items.
const NON_ITEM_FILE_NAMES: [&str; 2] = ["catalog.json", "collection.json"];

/// Where STAC items come from.
///
/// A source is either a STAC API items endpoint or a local directory of STAC
/// item files. Strings that start with `http://` or `https://` parse to API
/// sources, everything else parses to a directory source.
///
/// # Examples
///
/// ```
/// use stac_geoparquet_items::Source;
///
/// let api: Source = "https://stac.test/collections/an-id/items".parse().unwrap();
/// let directory: Source = "data/items".parse().unwrap();
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    /// A STAC API items endpoint.
    Api(Url),

    /// A directory of STAC item files.
    Directory(PathBuf),
}

/// Options for resolving items from a [Source].
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Recurse into subdirectories when reading from a directory source.
    pub recursive: bool,

    /// The page size to request from a STAC API source, sent as the `limit`
    /// query parameter.
    ///
    /// If `None`, the server's default page size is used.
    pub page_size: Option<usize>,
}

/// One page from a STAC API items endpoint.
#[derive(Debug, Deserialize)]
pub struct Page {
    /// The items on this page.
    pub features: Vec<Item>,

    /// The page's links, including the `next` link if there are more pages.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A lazy iterator over the pages of a STAC API items endpoint.
///
/// Requests are issued one at a time, each following the previous page's
/// `next` link. Iteration ends when a page has no `next` link, or after the
/// first error.
#[derive(Debug)]
pub struct Pages {
    client: reqwest::blocking::Client,
    next: Option<Url>,
}

impl Source {
    /// Resolves this source into a vector of items.
    ///
    /// Items are returned in source order: page order for API sources, file
    /// name order for directory sources.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use stac_geoparquet_items::{Options, Source};
    ///
    /// let source: Source = "data/items".parse().unwrap();
    /// let items = source.resolve(&Options::default()).unwrap();
    /// ```
    pub fn resolve(&self, options: &Options) -> Result<Vec<Item>> {
        match self {
            Source::Api(url) => {
                let mut items = Vec::new();
                for page in Pages::new(url.clone(), options.page_size)? {
                    let page = page?;
                    tracing::debug!("got a page with {} items", page.features.len());
                    items.extend(page.features);
                }
                Ok(items)
            }
            Source::Directory(directory) => read_directory(directory, options.recursive),
        }
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Source> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Source::Api(Url::parse(s)?))
        } else {
            Ok(Source::Directory(PathBuf::from(s)))
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Api(url) => write!(f, "{url}"),
            Source::Directory(directory) => write!(f, "{}", directory.display()),
        }
    }
}

impl Pages {
    /// Creates a new page iterator for an items endpoint.
    ///
    /// If `page_size` is provided it is appended to the url as the `limit`
    /// query parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_geoparquet_items::Pages;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://stac.test/collections/an-id/items").unwrap();
    /// let pages = Pages::new(url, Some(100)).unwrap();
    /// ```
    pub fn new(mut url: Url, page_size: Option<usize>) -> Result<Pages> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(crate::user_agent())
            .build()?;
        if let Some(page_size) = page_size {
            let _ = url
                .query_pairs_mut()
                .append_pair("limit", &page_size.to_string());
        }
        Ok(Pages {
            client,
            next: Some(url),
        })
    }

    fn page(&mut self, url: Url) -> Result<Page> {
        tracing::debug!("getting {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|error| Error::Request {
                url: url.to_string(),
                error,
            })?;
        let bytes = response.bytes().map_err(|error| Error::Request {
            url: url.to_string(),
            error,
        })?;
        let page: Page = serde_json::from_slice(&bytes).map_err(|error| Error::Parse {
            href: url.to_string(),
            error,
        })?;
        self.next = page
            .links
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| url.join(link.href.as_str()))
            .transpose()?;
        Ok(page)
    }
}

impl Iterator for Pages {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next.take()?;
        Some(self.page(url))
    }
}

fn read_directory(directory: &Path, recursive: bool) -> Result<Vec<Item>> {
    if !directory.is_dir() {
        return Err(Error::DirectoryNotFound(directory.to_path_buf()));
    }
    let mut walk = WalkDir::new(directory).min_depth(1).sort_by_file_name();
    if !recursive {
        walk = walk.max_depth(1);
    }
    let mut items = Vec::new();
    for entry in walk {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some("json") {
            continue;
        }
        if entry
            .file_name()
            .to_str()
            .is_some_and(|file_name| NON_ITEM_FILE_NAMES.contains(&file_name))
        {
            continue;
        }
        if let Some(item) = read_item(path)? {
            items.push(item);
        }
    }
    tracing::info!("read {} items from {}", items.len(), directory.display());
    Ok(items)
}

/// Reads a single file, returning `Ok(None)` when the file holds valid JSON
/// that is not a STAC item, e.g. a catalog saved under another name.
fn read_item(path: &Path) -> Result<Option<Item>> {
    let contents = std::fs::read(path)?;
    let value: serde_json::Value =
        serde_json::from_slice(&contents).map_err(|error| Error::Parse {
            href: path.to_string_lossy().into_owned(),
            error,
        })?;
    if value.get("type").and_then(|r#type| r#type.as_str()) != Some("Feature") {
        tracing::debug!("skipping non-item file: {}", path.display());
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|error| Error::Parse {
            href: path.to_string_lossy().into_owned(),
            error,
        })
}

#[cfg(test)]
mod tests {
    use super::{Options, Pages, Source};
    use crate::Error;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use url::Url;

    fn feature(id: &str) -> Value {
        json!({
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": id,
            "geometry": {"type": "Point", "coordinates": [105.68, 19.89]},
            "bbox": [105.68, 19.89, 105.68, 19.89],
            "properties": {"datetime": "2023-06-01T00:00:00Z"},
            "links": [],
            "assets": {}
        })
    }

    #[test]
    fn parse_api_source() {
        let source: Source = "https://stac.test/collections/an-id/items".parse().unwrap();
        assert!(matches!(source, Source::Api(_)));
    }

    #[test]
    fn parse_directory_source() {
        let source: Source = "data/items".parse().unwrap();
        assert_eq!(source, Source::Directory(PathBuf::from("data/items")));
    }

    #[test]
    fn read_directory() {
        let source = Source::Directory(PathBuf::from("data/items"));
        let items = source.resolve(&Options::default()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }

    #[test]
    fn read_directory_recursive() {
        let source = Source::Directory(PathBuf::from("data/items"));
        let options = Options {
            recursive: true,
            ..Default::default()
        };
        let items = source.resolve(&options).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].id, "c");
    }

    #[test]
    fn read_empty_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let source = Source::Directory(temp_dir.path().to_path_buf());
        let items = source.resolve(&Options::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn missing_directory() {
        let source = Source::Directory(PathBuf::from("data/not-there"));
        let error = source.resolve(&Options::default()).unwrap_err();
        assert!(matches!(error, Error::DirectoryNotFound(_)));
    }

    #[test]
    fn invalid_json() {
        let source = Source::Directory(PathBuf::from("data/invalid"));
        let error = source.resolve(&Options::default()).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }

    #[test]
    fn paginate() {
        let mut server = mockito::Server::new();
        let first = server
            .mock("GET", "/items")
            .with_body(
                json!({
                    "type": "FeatureCollection",
                    "features": [feature("a"), feature("b")],
                    "links": [{
                        "rel": "next",
                        "href": format!("{}/page-2", server.url()),
                        "type": "application/geo+json"
                    }]
                })
                .to_string(),
            )
            .create();
        let second = server
            .mock("GET", "/page-2")
            .with_body(
                json!({
                    "type": "FeatureCollection",
                    "features": [feature("c")],
                    "links": []
                })
                .to_string(),
            )
            .create();

        let source = Source::Api(Url::parse(&format!("{}/items", server.url())).unwrap());
        let items = source.resolve(&Options::default()).unwrap();
        let ids: Vec<_> = items.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        first.assert();
        second.assert();
    }

    #[test]
    fn page_size() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/items")
            .match_query(mockito::Matcher::UrlEncoded("limit".into(), "42".into()))
            .with_body(
                json!({
                    "type": "FeatureCollection",
                    "features": [feature("a")],
                    "links": []
                })
                .to_string(),
            )
            .create();

        let source = Source::Api(Url::parse(&format!("{}/items", server.url())).unwrap());
        let options = Options {
            page_size: Some(42),
            ..Default::default()
        };
        let items = source.resolve(&options).unwrap();
        assert_eq!(items.len(), 1);
        mock.assert();
    }

    #[test]
    fn pages_are_lazy() {
        let mut server = mockito::Server::new();
        let _first = server
            .mock("GET", "/items")
            .with_body(
                json!({
                    "type": "FeatureCollection",
                    "features": [feature("a")],
                    "links": [{
                        "rel": "next",
                        "href": format!("{}/page-2", server.url())
                    }]
                })
                .to_string(),
            )
            .create();
        let second = server
            .mock("GET", "/page-2")
            .with_body(
                json!({
                    "type": "FeatureCollection",
                    "features": [feature("b")],
                    "links": []
                })
                .to_string(),
            )
            .expect(0)
            .create();

        let url = Url::parse(&format!("{}/items", server.url())).unwrap();
        let mut pages = Pages::new(url, None).unwrap();
        let page = pages.next().unwrap().unwrap();
        assert_eq!(page.features.len(), 1);
        second.assert();
    }

    #[test]
    fn server_error() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/items").with_status(500).create();

        let source = Source::Api(Url::parse(&format!("{}/items", server.url())).unwrap());
        let error = source.resolve(&Options::default()).unwrap_err();
        assert!(matches!(error, Error::Request { .. }));
    }

    #[test]
    fn invalid_page() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/items")
            .with_body("not an item collection")
            .create();

        let source = Source::Api(Url::parse(&format!("{}/items", server.url())).unwrap());
        let error = source.resolve(&Options::default()).unwrap_err();
        assert!(matches!(error, Error::Parse { .. }));
    }
}
