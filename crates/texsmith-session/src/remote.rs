//! External collaborators: the persistence API and the PDF compilation
//! service.
//!
//! Both are narrow async interfaces; the core builds no retry logic on
//! top of them. A failure surfaces as an error state and the previous
//! successful artifact, if any, stays displayed. Save failures get a
//! local fallback write so an edit is never silently dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use texsmith_core::{Result, TexsmithError};

/// One node of a user's document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Opaque file identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `true` for folders.
    #[serde(default)]
    pub is_folder: bool,
    /// Child nodes (folders only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FileNode>,
}

/// Document persistence collaborator.
///
/// Implementations talk to the document-management backend; the session
/// layer only needs these four calls.
pub trait PersistenceApi {
    /// Creates or overwrites a document record.
    fn save(
        &self,
        id: &str,
        content: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Updates the content of an existing record.
    fn update(&self, id: &str, content: &str)
        -> impl std::future::Future<Output = Result<()>> + Send;

    /// Deletes a record.
    fn delete(&self, id: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Fetches the user's document tree.
    fn fetch_tree(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<FileNode>>> + Send;
}

/// Result of a compilation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutput {
    /// The rendered PDF bytes.
    Pdf(Vec<u8>),
    /// A structured compiler-log failure.
    Failure {
        /// The compiler log returned by the service.
        log: String,
    },
}

/// PDF compilation collaborator.
///
/// Accepts the main LaTeX source plus a map of auxiliary included files
/// (for `\input`/`\include` resolution).
pub trait PdfCompiler {
    /// Compiles `main_source` with `aux_files` available by name.
    fn compile(
        &self,
        main_source: &str,
        aux_files: &HashMap<String, String>,
    ) -> impl std::future::Future<Output = Result<CompileOutput>> + Send;
}

/// HTTP client for a remote compilation service.
///
/// Posts `{ "source": ..., "files": {...} }` as JSON; a success response
/// body is the PDF binary, a failure response body is the compiler log.
#[derive(Debug, Clone)]
pub struct HttpCompiler {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpCompiler {
    /// Creates a client for the given endpoint URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl PdfCompiler for HttpCompiler {
    async fn compile(
        &self,
        main_source: &str,
        aux_files: &HashMap<String, String>,
    ) -> Result<CompileOutput> {
        let payload = serde_json::json!({
            "source": main_source,
            "files": aux_files,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| TexsmithError::CompileError(format!("compile request failed: {e}")))?;

        if response.status().is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| TexsmithError::CompileError(format!("compile response lost: {e}")))?;
            log::info!("compile succeeded ({} bytes)", bytes.len());
            Ok(CompileOutput::Pdf(bytes.to_vec()))
        } else {
            let status = response.status();
            let log_text = response.text().await.unwrap_or_default();
            log::warn!("compile failed with status {status}");
            Ok(CompileOutput::Failure { log: log_text })
        }
    }
}

/// In-memory persistence, for tests and offline sessions.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: std::sync::Mutex<HashMap<String, (String, String)>>,
}

impl MemoryPersistence {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a stored document's content.
    #[must_use]
    pub fn content(&self, id: &str) -> Option<String> {
        self.records
            .lock()
            .expect("persistence lock poisoned")
            .get(id)
            .map(|(_, content)| content.clone())
    }
}

impl PersistenceApi for MemoryPersistence {
    async fn save(&self, id: &str, content: &str, name: &str) -> Result<()> {
        self.records
            .lock()
            .expect("persistence lock poisoned")
            .insert(id.to_string(), (name.to_string(), content.to_string()));
        Ok(())
    }

    async fn update(&self, id: &str, content: &str) -> Result<()> {
        let mut records = self.records.lock().expect("persistence lock poisoned");
        match records.get_mut(id) {
            Some((_, stored)) => {
                *stored = content.to_string();
                Ok(())
            }
            None => Err(TexsmithError::PersistenceError(format!(
                "no record with id {id}"
            ))),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records
            .lock()
            .expect("persistence lock poisoned")
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TexsmithError::PersistenceError(format!("no record with id {id}")))
    }

    async fn fetch_tree(&self, _user_id: &str) -> Result<Vec<FileNode>> {
        let records = self.records.lock().expect("persistence lock poisoned");
        Ok(records
            .iter()
            .map(|(id, (name, _))| FileNode {
                id: id.clone(),
                name: name.clone(),
                is_folder: false,
                children: Vec::new(),
            })
            .collect())
    }
}

/// Local fallback for failed saves.
///
/// When the remote write fails, the content lands here so the user's
/// edit survives; the session retries the remote write on its next save
/// event.
#[derive(Debug, Clone)]
pub struct LocalFallbackStore {
    dir: PathBuf,
}

impl LocalFallbackStore {
    /// Creates a store rooted at `dir` (created on first write).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        // Identifiers are opaque; keep the file name shell-safe.
        let safe: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.tex"))
    }

    /// Writes a fallback copy, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or the
    /// file cannot be written.
    pub fn write(&self, id: &str, content: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(id);
        std::fs::write(&path, content)?;
        log::warn!("remote save failed; content kept at {}", path.display());
        Ok(path)
    }

    /// Reads a fallback copy back, if one exists.
    #[must_use]
    pub fn read(&self, id: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(id)).ok()
    }

    /// Removes a fallback copy after a successful remote save.
    pub fn clear(&self, id: &str) {
        let _ = std::fs::remove_file(self.path_for(id));
    }

    /// The directory fallback copies live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
