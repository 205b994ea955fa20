use thiserror::Error;

/// Failure while fetching or decoding the startup data.
///
/// This is the only error class the map knows about: anything that goes
/// wrong before the first frame is a load failure, and the map is never
/// rendered.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("request to {location} failed: {source}")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{location} answered with HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("cannot read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed table {location}: {message}")]
    Table { location: String, message: String },

    #[error("malformed JSON in {location}: {source}")]
    Json {
        location: String,
        #[source]
        source: simd_json::Error,
    },

    #[error("malformed topology: {0}")]
    Topology(String),
}

pub type LoadResult<T> = Result<T, LoadError>;
