use std::path::{Path, PathBuf};
use std::fs;
use std::io;
use std::sync::{Arc, Mutex};
use std::env;
use tokio::sync::Mutex as AsyncMutex;
use reqwest;
use sha2::{Sha256, Digest};
use dirs;
use log;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found in bundle: {0}")]
    NotFound(String),
    #[error("Invalid asset name: {0:?}")]
    InvalidName(String),
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Asset verification failed")]
    VerificationFailed,
    #[error("Hash mismatch: expected {expected}, got {actual} for {name}")]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// An asset fetched over HTTP and pinned by its SHA-256 digest.
#[derive(Debug, Clone)]
pub struct RemoteAsset {
    /// File name in the asset cache
    pub name: String,
    pub url: String,
    /// Lowercase hex SHA-256 of the file content
    pub sha256: String,
}

/// Materializes named assets (model artifact, labels file) as local files.
///
/// Assets live in a cache directory. A cached file with non-zero size is reused
/// as is; otherwise it is copied from the bundle directory, or downloaded for a
/// [`RemoteAsset`]. Files are written under a temporary name and renamed into
/// place, so a partial copy is never picked up.
#[derive(Debug, Clone)]
pub struct AssetManager {
    assets_dir: PathBuf,
    bundle_dir: PathBuf,
    copy_lock: Arc<Mutex<()>>,
    download_lock: Arc<AsyncMutex<()>>,
}

impl AssetManager {
    /// Creates a new AssetManager with the default cache and bundle directories
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::get_default_assets_dir(), Self::get_default_bundle_dir())
    }

    /// Returns the default asset cache directory path
    pub fn get_default_assets_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var("AFFECT_CACHE") {
            return PathBuf::from(path).join("assets");
        }

        // 2. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("affect").join("assets");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("affect").join("assets");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("affect").join("assets")
    }

    /// Returns the default bundle directory: `AFFECT_ASSET_BUNDLE`, else `./assets`
    pub fn get_default_bundle_dir() -> PathBuf {
        match env::var("AFFECT_ASSET_BUNDLE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => PathBuf::from("assets"),
        }
    }

    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(assets_dir: P, bundle_dir: Q) -> io::Result<Self> {
        let assets_dir = assets_dir.as_ref().to_path_buf();
        fs::create_dir_all(&assets_dir)?;
        Ok(Self {
            assets_dir,
            bundle_dir: bundle_dir.as_ref().to_path_buf(),
            copy_lock: Arc::new(Mutex::new(())),
            download_lock: Arc::new(AsyncMutex::new(())),
        })
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn bundle_dir(&self) -> &Path {
        &self.bundle_dir
    }

    /// Location of `name` in the cache, whether or not it is materialized yet.
    pub fn cached_path(&self, name: &str) -> Result<PathBuf, AssetError> {
        Self::validate_name(name)?;
        Ok(self.assets_dir.join(name))
    }

    pub fn is_materialized(&self, name: &str) -> bool {
        match self.cached_path(name) {
            Ok(path) => Self::is_usable(&path),
            Err(_) => false,
        }
    }

    /// Returns a readable local path for `name`, copying it from the bundle on first use.
    ///
    /// # Errors
    /// - `InvalidName` if `name` is not a plain file name
    /// - `NotFound` if the asset is neither cached nor in the bundle
    /// - `IoError` if the copy fails
    pub fn asset_path(&self, name: &str) -> Result<PathBuf, AssetError> {
        let target = self.cached_path(name)?;
        if Self::is_usable(&target) {
            log::debug!("Reusing cached asset {:?}", target);
            return Ok(target);
        }

        let _lock = self.copy_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have finished the copy while we waited
        if Self::is_usable(&target) {
            return Ok(target);
        }

        let source = self.bundle_dir.join(name);
        if !source.is_file() {
            log::error!("Asset '{}' is not cached and not present in bundle {:?}", name, self.bundle_dir);
            return Err(AssetError::NotFound(name.to_string()));
        }

        log::info!("Materializing asset {:?} -> {:?}", source, target);
        let partial = Self::partial_path(&target);
        let copied = fs::copy(&source, &partial).and_then(|bytes| {
            fs::rename(&partial, &target)?;
            Ok(bytes)
        });
        match copied {
            Ok(bytes) => {
                log::info!("Copied {} bytes for asset '{}'", bytes, name);
                Ok(target)
            }
            Err(e) => {
                log::error!("Failed to materialize asset '{}': {}", name, e);
                let _ = fs::remove_file(&partial);
                Err(AssetError::IoError(e))
            }
        }
    }

    pub fn remove_asset(&self, name: &str) -> Result<(), AssetError> {
        let path = self.cached_path(name)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, AssetError> {
        log::info!("Verifying file: {:?}", path);
        let bytes = fs::read(path)?;
        log::info!("Read {} bytes", bytes.len());
        let hash = sha256_hex(&bytes);
        log::info!("Calculated hash: {}", hash);
        log::info!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    /// Checks a cached asset against a SHA-256 digest; `false` when it is missing.
    pub fn verify_asset(&self, name: &str, expected_hash: &str) -> Result<bool, AssetError> {
        let path = self.cached_path(name)?;
        if !path.exists() {
            log::info!("Asset {:?} does not exist", path);
            return Ok(false);
        }
        self.verify_file(&path, expected_hash)
    }

    /// Downloads a remote asset into the cache, replacing any cached copy.
    pub async fn download_asset(&self, asset: &RemoteAsset) -> Result<PathBuf, AssetError> {
        let path = self.cached_path(&asset.name)?;
        let _lock = self.download_lock.lock().await;

        match self.download_and_verify_file(&asset.url, &path, &asset.sha256, &asset.name).await {
            Ok(()) => {
                log::info!("Asset '{}' ready to use", asset.name);
                Ok(path)
            }
            Err(e) => {
                log::error!("Failed to download asset '{}': {}", asset.name, e);
                // Cleanup on failure
                let _ = self.remove_asset(&asset.name);
                Err(e)
            }
        }
    }

    async fn download_and_verify_file(
        &self,
        url: &str,
        path: &Path,
        expected_hash: &str,
        name: &str,
    ) -> Result<(), AssetError> {
        log::info!("Downloading {} from {} to {:?}", name, url, path);
        let response = reqwest::get(url).await?.error_for_status()?;
        log::info!("Download response status: {}", response.status());
        let bytes = response.bytes().await?;
        log::info!("Downloaded {} bytes", bytes.len());

        let hash = sha256_hex(&bytes);
        log::info!("Calculated hash: {}", hash);

        if !hash.eq_ignore_ascii_case(expected_hash) {
            log::error!("{} hash mismatch: expected {}, got {}", name, expected_hash, hash);
            return Err(AssetError::HashMismatch {
                name: name.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }

        let partial = Self::partial_path(path);
        log::info!("Writing {} bytes to {:?}", bytes.len(), partial);
        fs::write(&partial, &bytes)?;
        fs::rename(&partial, path)?;

        // Verify after writing
        log::info!("Verifying written file");
        if !self.verify_file(path, expected_hash)? {
            return Err(AssetError::VerificationFailed);
        }

        log::info!("{} downloaded and verified successfully", name);
        Ok(())
    }

    /// Ensures that a remote asset is cached and verified.
    /// If it doesn't exist, it will be downloaded.
    /// If verification fails, it will be re-downloaded.
    pub async fn ensure_asset(&self, asset: &RemoteAsset) -> Result<PathBuf, AssetError> {
        log::info!("Checking if asset '{}' is cached...", asset.name);
        if self.is_materialized(&asset.name) {
            log::info!("Asset exists, verifying...");
            if self.verify_asset(&asset.name, &asset.sha256)? {
                log::info!("Asset verification successful");
                return self.cached_path(&asset.name);
            }
            log::info!("Asset verification failed, re-downloading...");
            self.remove_asset(&asset.name)?;
        } else {
            log::info!("Asset not found, downloading...");
        }
        self.download_asset(asset).await
    }

    fn validate_name(name: &str) -> Result<(), AssetError> {
        if name.is_empty() || name == "." || name == ".." || name.contains(|c| c == '/' || c == '\\') {
            return Err(AssetError::InvalidName(name.to_string()));
        }
        Ok(())
    }

    fn is_usable(path: &Path) -> bool {
        fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
    }

    fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(format!(".{}.part", std::process::id()));
        path.with_file_name(name)
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
