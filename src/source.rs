//! Loading images from disk, from a URL, or from bytes already in memory.

use std::path::Path;

use image::RgbaImage;

use crate::error::{PaletteError, Result};

/// A decoded image plus the name palettes built from it default to.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub name: String,
    pub image: RgbaImage,
}

/// Retrieves raw bytes for a remote location.
pub trait Fetch {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String>;
}

/// Blocking HTTP(S) fetcher.
#[cfg(feature = "remote")]
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

#[cfg(feature = "remote")]
impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, String> {
        use std::io::Read;

        let response = ureq::get(url).call().map_err(|e| e.to_string())?;
        let mut buf = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut buf)
            .map_err(|e| e.to_string())?;
        Ok(buf)
    }
}

/// File stem of a path or URL: `images/south_beach_sunset.jpg` → `south_beach_sunset`.
pub fn stem_of(location: &str) -> String {
    Path::new(location)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Decode bytes that were obtained some other way.
pub fn load_source_bytes(bytes: &[u8], name: &str) -> Result<SourceImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|source| PaletteError::UndecodableSource {
            location: name.to_string(),
            source,
        })?
        .to_rgba8();
    Ok(SourceImage {
        name: stem_of(name),
        image,
    })
}

/// Load `location` as a local file, falling back to `fetcher` for URLs.
///
/// A local miss on something that is not a URL (or with no fetcher) is
/// [`PaletteError::SourceNotFound`]; a URL whose transfer fails is
/// [`PaletteError::SourceFetchFailed`]. A local file that exists but cannot
/// be read is [`PaletteError::SourceUnreadable`], carrying the I/O error.
pub fn load_source(location: &str, fetcher: Option<&dyn Fetch>) -> Result<SourceImage> {
    let path = Path::new(location);
    let bytes = if path.is_file() {
        std::fs::read(path).map_err(|source| PaletteError::SourceUnreadable {
            location: location.to_string(),
            source,
        })?
    } else {
        match fetcher {
            Some(fetcher) if is_url(location) => {
                fetcher
                    .fetch(location)
                    .map_err(|reason| PaletteError::SourceFetchFailed {
                        url: location.to_string(),
                        reason: format!("not a local file, and the download failed: {reason}"),
                    })?
            }
            _ => {
                return Err(PaletteError::SourceNotFound {
                    location: location.to_string(),
                });
            }
        }
    };
    load_source_bytes(&bytes, location)
}
