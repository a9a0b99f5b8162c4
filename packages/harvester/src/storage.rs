//! Persistence of section documents.
//!
//! Documents are addressed by a storage key derived from the title, part,
//! subpart and section id. A [`DocumentSink`] decides where the key points:
//! a local directory tree or an HTTP object store.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::{HarvesterError, Result};
use crate::http::send_with_retry;
use crate::types::SectionDocument;

/// Destination for serialized section documents.
///
/// Sinks are shared between the worker threads of a harvest.
pub trait DocumentSink: Send + Sync {
    /// Store a document under `key` and return where it ended up.
    fn store(&self, key: &str, document: &SectionDocument) -> Result<String>;
}

/// Derive the storage key of a section document.
///
/// Dots in the section id become dashes so the key has a single extension.
///
/// # Examples
/// ```
/// use ecfr_harvester::storage::storage_key;
///
/// assert_eq!(
///     storage_key("niaho-mapper-output/cms-cop", 42, "482", "A", "482.1"),
///     "niaho-mapper-output/cms-cop/title-42/part-482/subpart-A/482-1.json"
/// );
/// ```
#[must_use]
pub fn storage_key(prefix: &str, title: u32, part: &str, subpart: &str, section_id: &str) -> String {
    let file_name = section_id.replace('.', "-");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("title-{title}/part-{part}/subpart-{subpart}/{file_name}.json")
    } else {
        format!("{prefix}/title-{title}/part-{part}/subpart-{subpart}/{file_name}.json")
    }
}

/// Serialize a document as pretty-printed JSON.
///
/// Non-ASCII characters such as `§` are written as-is.
pub fn document_json(document: &SectionDocument) -> Result<String> {
    Ok(serde_json::to_string_pretty(document)?)
}

/// Writes documents below a local directory.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    root: PathBuf,
}

impl FilesystemSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory that keys are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSink for FilesystemSink {
    fn store(&self, key: &str, document: &SectionDocument) -> Result<String> {
        let output_file = self.root.join(key);
        let Some(output_dir) = output_file.parent() else {
            return Err(HarvesterError::Storage {
                key: key.to_string(),
                message: "key has no parent directory".to_string(),
            });
        };
        fs::create_dir_all(output_dir)?;

        let file_name = output_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_file = output_dir.join(format!(".{file_name}.tmp"));

        let content = document_json(document)?;

        // Write to temp file first, then sync and rename
        {
            let mut file = File::create(&temp_file)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if output_file.exists() {
            fs::remove_file(&output_file)?;
        }

        fs::rename(&temp_file, &output_file)?;

        tracing::debug!(path = %output_file.display(), "stored section document");
        Ok(output_file.display().to_string())
    }
}

/// Uploads documents to an HTTP object store with `PUT {base_url}/{key}`.
///
/// NOTE: Do NOT derive `Debug` on this struct, the bearer token would be exposed.
pub struct HttpObjectSink {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpObjectSink {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every upload.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

impl DocumentSink for HttpObjectSink {
    fn store(&self, key: &str, document: &SectionDocument) -> Result<String> {
        let url = self.object_url(key);
        let body = document_json(document)?;

        let result = send_with_retry(&self.client, &url, |client| {
            let request = client
                .put(&url)
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
            match &self.bearer_token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        });

        match result {
            Ok(response) => {
                tracing::debug!(url = %url, status = %response.status(), "uploaded section document");
                Ok(url)
            }
            Err(e @ (HarvesterError::Http(_) | HarvesterError::RetriesExhausted { .. })) => {
                Err(HarvesterError::Storage {
                    key: key.to_string(),
                    message: e.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}
