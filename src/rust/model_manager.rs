use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::classifier::{Artifact, ClassifierError, TrainedModel};

/// File name of the model artifact inside a models directory.
pub const ARTIFACT_FILE_NAME: &str = "sleep_disorder_model.json";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model file not found: {0}")]
    NotFound(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Artifact is not valid JSON: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(#[from] ClassifierError),
    #[error("Hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },
}

/// Locates, verifies and loads the persisted model artifact.
#[derive(Debug, Clone)]
pub struct ModelManager {
    model_path: PathBuf,
}

impl ModelManager {
    /// Creates a new ModelManager for the default artifact location
    pub fn new_default() -> Self {
        Self::new(Self::get_default_model_path())
    }

    /// Returns the default artifact path
    pub fn get_default_model_path() -> PathBuf {
        Self::resolve_model_path(env::var("SOMNIA_MODEL").ok(), dirs::data_dir())
    }

    fn resolve_model_path(env_override: Option<String>, data_dir: Option<PathBuf>) -> PathBuf {
        // 1. Check environment variable
        if let Some(path) = env_override {
            return PathBuf::from(path);
        }

        // 2. Artifact shipped next to the working directory
        let local = PathBuf::from("models").join(ARTIFACT_FILE_NAME);
        if local.exists() {
            return local;
        }

        // 3. Platform-specific data directory
        if let Some(data_dir) = data_dir {
            return data_dir.join("somnia").join(ARTIFACT_FILE_NAME);
        }

        // 4. Fall back to the relative path even if it does not exist yet
        local
    }

    pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_model_available(&self) -> bool {
        let exists = self.model_path.is_file();
        log::debug!("Model path: {:?} (exists: {})", self.model_path, exists);
        exists
    }

    fn hash_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// SHA-256 of the artifact file as lowercase hex
    pub fn compute_hash(&self) -> Result<String, ModelError> {
        let bytes = self.read_artifact_bytes()?;
        Ok(Self::hash_bytes(&bytes))
    }

    /// Checks the artifact against an expected SHA-256. A missing file is not
    /// an error here, it simply does not verify.
    pub fn verify_model(&self, expected_hash: &str) -> Result<bool, ModelError> {
        if !self.is_model_available() {
            log::info!("Model file {:?} does not exist", self.model_path);
            return Ok(false);
        }
        let hash = self.compute_hash()?;
        log::info!("Calculated hash: {}", hash);
        log::info!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    fn read_artifact_bytes(&self) -> Result<Vec<u8>, ModelError> {
        if !self.is_model_available() {
            return Err(ModelError::NotFound(self.model_path.display().to_string()));
        }
        Ok(fs::read(&self.model_path)?)
    }

    /// Parses and validates the artifact without any checksum.
    pub fn load_model(&self) -> Result<TrainedModel, ModelError> {
        self.load_verified(None)
    }

    /// Parses and validates the artifact, first checking its SHA-256 when one
    /// is given. The file is read once so the hash covers exactly what is
    /// parsed.
    pub fn load_verified(&self, expected_hash: Option<&str>) -> Result<TrainedModel, ModelError> {
        log::info!("Loading model artifact from {:?}", self.model_path);
        let bytes = self.read_artifact_bytes()?;

        if let Some(expected) = expected_hash {
            let actual = Self::hash_bytes(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                log::error!("Artifact hash mismatch: expected {}, got {}", expected, actual);
                return Err(ModelError::HashMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
            log::info!("Artifact hash verified");
        }

        let artifact: Artifact = serde_json::from_slice(&bytes)?;
        let model = TrainedModel::from_artifact(artifact)?;
        log::info!(
            "Model loaded: {} occupations, classes {:?}",
            model.categories().occupation.len(),
            model.class_labels()
        );
        Ok(model)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .model_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| ARTIFACT_FILE_NAME.into());
        name.push(".part");
        self.model_path.with_file_name(name)
    }

    /// Writes to a sibling file and renames it into place, so the managed
    /// path only ever holds a complete artifact.
    fn write_artifact_bytes(&self, bytes: &[u8]) -> Result<(), ModelError> {
        if let Some(parent) = self.model_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let staging = self.staging_path();
        if let Err(e) = fs::write(&staging, bytes) {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        fs::rename(&staging, &self.model_path)?;
        Ok(())
    }

    /// Writes `model` as a pretty-printed artifact, creating parent
    /// directories as needed.
    pub fn save_model(&self, model: &TrainedModel) -> Result<(), ModelError> {
        let json = serde_json::to_vec_pretty(&model.to_artifact())?;
        self.write_artifact_bytes(&json)?;
        log::info!("Model artifact written to {:?}", self.model_path);
        Ok(())
    }

    /// Downloads an artifact, checks its hash and that it parses as a valid
    /// model, then writes it to the managed path. Nothing is written unless
    /// every check passes.
    pub async fn download_model(&self, url: &str, expected_hash: &str) -> Result<TrainedModel, ModelError> {
        log::info!("Downloading model artifact from {} to {:?}", url, self.model_path);
        let response = reqwest::get(url).await?.error_for_status()?;
        log::info!("Download response status: {}", response.status());
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let hash = Self::hash_bytes(&bytes);
        if !hash.eq_ignore_ascii_case(expected_hash) {
            log::error!("Artifact hash mismatch: expected {}, got {}", expected_hash, hash);
            return Err(ModelError::HashMismatch {
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        let artifact: Artifact = serde_json::from_slice(&bytes)?;
        let model = TrainedModel::from_artifact(artifact)?;

        self.write_artifact_bytes(&bytes)?;
        log::info!("Model artifact downloaded and verified");
        Ok(model)
    }

    /// Downloads the artifact unless a copy with the expected hash is already
    /// in place.
    pub async fn ensure_model_downloaded(&self, url: &str, expected_hash: &str) -> Result<TrainedModel, ModelError> {
        if self.verify_model(expected_hash)? {
            log::info!("Existing model artifact verified successfully");
            return self.load_verified(Some(expected_hash));
        }
        self.download_model(url, expected_hash).await
    }

    pub fn remove_model(&self) -> Result<(), ModelError> {
        if self.model_path.exists() {
            fs::remove_file(&self.model_path)?;
        }
        Ok(())
    }
}
