//! Where raw track bytes come from.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::info;
use thiserror::Error;

/// Track download endpoint of the netcoupe competition; `{id}` is the file id.
pub const NETCOUPE_TRACK_URL: &str = "http://netcoupe.net/Download/DownloadIGC.aspx?FileID={id}";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("track {0:?} not found")]
    NotFound(String),
    #[error("invalid track identifier {0:?}")]
    InvalidIdentifier(String),
    #[error("upstream fetch failed: {0}")]
    Upstream(String),
}

/// Supplies the raw bytes of a track given its identifier.
pub trait TrackSource {
    fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError>;
}

/// Tracks stored as files below a root directory.
#[derive(Clone, Debug)]
pub struct FileSource {
    root: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        FileSource {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl TrackSource for FileSource {
    fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
        let relative = Path::new(identifier);
        let plain = !identifier.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(FetchError::InvalidIdentifier(identifier.to_string()));
        }
        let path = self.root.join(relative);
        match fs::read(&path) {
            Ok(bytes) => {
                info!("read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(identifier.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(feature = "fetch")]
pub use http::HttpSource;

#[cfg(feature = "fetch")]
mod http {
    use log::info;
    use reqwest::blocking::Client;

    use super::{FetchError, TrackSource, NETCOUPE_TRACK_URL};

    /// Tracks downloaded over HTTP from a URL template containing `{id}`.
    pub struct HttpSource {
        client: Client,
        url_template: String,
    }

    impl HttpSource {
        pub fn new(url_template: impl Into<String>) -> Result<Self, FetchError> {
            let client = Client::builder()
                .user_agent("glide-engine-fetcher/0.1")
                .build()
                .map_err(|e| FetchError::Upstream(e.to_string()))?;
            Ok(HttpSource {
                client,
                url_template: url_template.into(),
            })
        }

        pub fn netcoupe() -> Result<Self, FetchError> {
            Self::new(NETCOUPE_TRACK_URL)
        }

        pub fn url_for(&self, identifier: &str) -> String {
            self.url_template.replace("{id}", identifier)
        }
    }

    impl TrackSource for HttpSource {
        fn fetch(&self, identifier: &str) -> Result<Vec<u8>, FetchError> {
            let url = self.url_for(identifier);
            info!("downloading track {identifier} from {url}");
            let response = self
                .client
                .get(&url)
                .send()
                .map_err(|e| FetchError::Upstream(format!("{url}: {e}")))?;
            let status = response.status();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(identifier.to_string()));
            }
            if !status.is_success() {
                return Err(FetchError::Upstream(format!("{url} returned {status}")));
            }
            let bytes = response
                .bytes()
                .map_err(|e| FetchError::Upstream(format!("{url}: {e}")))?;
            Ok(bytes.to_vec())
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_source_reads_below_its_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("flight.igc")).unwrap();
        file.write_all(b"AXXXABC\n").unwrap();

        let source = FileSource::new(dir.path());
        assert_eq!(source.fetch("flight.igc").unwrap(), b"AXXXABC\n");
        assert!(matches!(source.fetch("missing.igc"), Err(FetchError::NotFound(_))));
        assert!(matches!(
            source.fetch("../flight.igc"),
            Err(FetchError::InvalidIdentifier(_))
        ));
        assert!(matches!(source.fetch(""), Err(FetchError::InvalidIdentifier(_))));
    }
}
