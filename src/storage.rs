use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

/// Bearer token source for GCS requests, as populated by
/// `gcloud auth print-access-token` in CI and local shells.
const TOKEN_ENV_VAR: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from object store operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// The HTTP request itself failed (connect, timeout, TLS)
    #[error("object store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a status we don't handle
    #[error("object store returned {status} for '{path}'")]
    UnexpectedStatus {
        /// HTTP status code returned by the store
        status: StatusCode,
        /// Blob path the request addressed
        path: String,
    },

    /// Read of a blob that does not exist
    #[error("object not found: '{0}'")]
    NotFound(String),

    /// Local filesystem failure (only from [`LocalStore`])
    #[error("local store I/O failed for '{path}'")]
    Io {
        /// Path within the store root
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// A bucket of blobs addressed by relative path strings.
///
/// Paths ending in `/` are folder markers: zero-byte objects standing in
/// for directories in stores that have no directory concept.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectStore {
    /// Check whether a blob exists at `path`
    fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Read the blob at `path` as UTF-8 text
    fn read_string(&self, path: &str) -> Result<String, StorageError>;

    /// Write `contents` to `path`, overwriting any existing blob
    fn write_string(&self, path: &str, contents: &str) -> Result<(), StorageError>;
}

/// Google Cloud Storage bucket accessed over the XML API.
///
/// The bucket name is fixed at construction; callers address blobs by
/// bucket-relative path only. Authentication is a bearer token read from
/// `GOOGLE_OAUTH_ACCESS_TOKEN` if set (public buckets work without one).
pub struct GcsStore {
    client: Client,
    bucket: String,
    token: Option<String>,
}

impl GcsStore {
    /// Create a store for the named bucket
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(bucket: &str) -> Result<Self, StorageError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            bucket: bucket.to_owned(),
            token: std::env::var(TOKEN_ENV_VAR).ok(),
        })
    }

    fn object_url(&self, path: &str) -> String {
        format!("https://storage.googleapis.com/{}/{}", self.bucket, path)
    }

    fn authorize(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl ObjectStore for GcsStore {
    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let response = self.authorize(self.client.head(self.object_url(path))).send()?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::UnexpectedStatus {
                status,
                path: path.to_owned(),
            }),
        }
    }

    fn read_string(&self, path: &str) -> Result<String, StorageError> {
        let response = self.authorize(self.client.get(self.object_url(path))).send()?;
        match response.status() {
            StatusCode::OK => Ok(response.text()?),
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(path.to_owned())),
            status => Err(StorageError::UnexpectedStatus {
                status,
                path: path.to_owned(),
            }),
        }
    }

    fn write_string(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        let response = self
            .authorize(self.client.put(self.object_url(path)))
            .body(contents.to_owned())
            .send()?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(StorageError::UnexpectedStatus {
                status: response.status(),
                path: path.to_owned(),
            })
        }
    }
}

/// Directory-rooted store for local pipeline runs and tests.
///
/// Blob paths map to files under the root; folder-marker paths (trailing
/// `/`) map to directories.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_end_matches('/'))
    }
}

impl ObjectStore for LocalStore {
    fn exists(&self, path: &str) -> Result<bool, StorageError> {
        Ok(self.resolve(path).exists())
    }

    fn read_string(&self, path: &str) -> Result<String, StorageError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(StorageError::NotFound(path.to_owned()));
        }
        fs::read_to_string(&full).map_err(|source| StorageError::Io {
            path: path.to_owned(),
            source,
        })
    }

    fn write_string(&self, path: &str, contents: &str) -> Result<(), StorageError> {
        let full = self.resolve(path);
        if path.ends_with('/') {
            // Marker object: the directory itself is the blob
            return fs::create_dir_all(&full).map_err(|source| StorageError::Io {
                path: path.to_owned(),
                source,
            });
        }
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: path.to_owned(),
                source,
            })?;
        }
        fs::write(&full, contents).map_err(|source| StorageError::Io {
            path: path.to_owned(),
            source,
        })
    }
}
