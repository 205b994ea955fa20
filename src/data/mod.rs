pub mod join;
pub mod table;
pub mod topology;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use geojson::FeatureCollection;

use crate::error::{LoadError, LoadResult};
pub use join::{feature_key, index_by_key, merge_properties};
pub use table::{parse_tsv, CountryRecord};
pub use topology::Topology;

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Http(String),
    File(PathBuf),
}

impl Location {
    /// `http(s)://` is fetched over the network, `file://` and plain paths
    /// are read from disk.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Location::Http(raw.to_string())
        } else if let Some(path) = raw.strip_prefix("file://") {
            Location::File(PathBuf::from(path))
        } else {
            Location::File(PathBuf::from(raw))
        }
    }

    fn describe(&self) -> String {
        match self {
            Location::Http(url) => url.clone(),
            Location::File(path) => path.display().to_string(),
        }
    }

    /// Read the whole document. No retries and no timeout.
    pub fn fetch(&self) -> LoadResult<Vec<u8>> {
        match self {
            Location::Http(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(None::<Duration>)
                    .build()
                    .map_err(|source| LoadError::Http {
                        location: url.clone(),
                        source,
                    })?;
                let response = client.get(url).send().map_err(|source| LoadError::Http {
                    location: url.clone(),
                    source,
                })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        location: url.clone(),
                        status: status.as_u16(),
                    });
                }

                let body = response.bytes().map_err(|source| LoadError::Http {
                    location: url.clone(),
                    source,
                })?;
                Ok(body.to_vec())
            }
            Location::File(path) => fs::read(path).map_err(|source| LoadError::Io {
                location: path.display().to_string(),
                source,
            }),
        }
    }
}

/// The two startup documents.
#[derive(Debug, Clone)]
pub struct Sources {
    pub table: Location,
    pub topology: Location,
}

/// Decoded startup data: table rows and the features of one topology object.
#[derive(Debug)]
pub struct Dataset {
    pub records: Vec<CountryRecord>,
    pub features: FeatureCollection,
}

/// Fetch and decode both documents.
///
/// Both reads run concurrently and the call returns once both are done.
/// If either fails the whole load fails. When both fail, the table error
/// is the one returned, whichever failed first in time.
pub fn load(sources: &Sources, object: &str) -> LoadResult<Dataset> {
    let (table, topology) = rayon::join(
        || load_table(&sources.table),
        || load_features(&sources.topology, object),
    );

    let records = table?;
    let features = topology?;

    tracing::info!(
        records = records.len(),
        features = features.features.len(),
        "loaded map data"
    );

    Ok(Dataset { records, features })
}

fn load_table(location: &Location) -> LoadResult<Vec<CountryRecord>> {
    let bytes = location.fetch()?;
    let text = String::from_utf8(bytes).map_err(|e| LoadError::Table {
        location: location.describe(),
        message: e.to_string(),
    })?;
    parse_tsv(&text).map_err(|message| LoadError::Table {
        location: location.describe(),
        message,
    })
}

fn load_features(location: &Location, object: &str) -> LoadResult<FeatureCollection> {
    let mut bytes = location.fetch()?;
    let topology = Topology::from_slice(&mut bytes).map_err(|source| LoadError::Json {
        location: location.describe(),
        source,
    })?;
    topology.feature_collection(object)
}
