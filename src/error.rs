use thiserror::Error;

/// Everything that can go wrong between loading an image and handing back a palette.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The location is not an existing local file and not a fetchable URL.
    #[error("image source {location} not found")]
    SourceNotFound { location: String },

    /// A local file exists but could not be read.
    #[error("could not read {location}: {source}")]
    SourceUnreadable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// The location looked like a URL but the transfer failed.
    #[error("could not fetch {url}: {reason}")]
    SourceFetchFailed { url: String, reason: String },

    /// Bytes were read but the decoder rejected them.
    #[error("unable to decode image {location}: {source}")]
    UndecodableSource {
        location: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Nothing left to cluster, usually after transparency filtering.
    #[error("no pixels left to cluster")]
    InsufficientData,
}

pub type Result<T> = std::result::Result<T, PaletteError>;
