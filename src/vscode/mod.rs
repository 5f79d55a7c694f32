//! VS Code extension cache
//!
//! Extensions are downloaded once as VSIX packages from the marketplace
//! and unpacked under `<cache>/extensions/<id>/`. The graph compiler then
//! copies `extensions/<id>/extension` out of the cache context into the
//! image.

use crate::config::{Config, ConfigManager};
use crate::environment::Extension;
use crate::error::{EnvError, EnvResult};
use async_trait::async_trait;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Makes extension files available to the build
#[async_trait]
pub trait PluginCache: Send + Sync {
    /// Fetch the extension unless it is already cached. Idempotent.
    async fn ensure_cached(&self, extension: &Extension) -> EnvResult<()>;

    /// Location of the extension's files, relative to the cache context
    fn plugin_path(&self, extension: &Extension) -> String;
}

/// Marketplace-backed extension cache
#[derive(Debug, Clone)]
pub struct VscodeClient {
    cache_dir: PathBuf,
    marketplace_url: String,
}

impl VscodeClient {
    pub fn new(cache_dir: PathBuf, marketplace_url: impl Into<String>) -> Self {
        Self {
            cache_dir,
            marketplace_url: marketplace_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ConfigManager::cache_dir(config),
            config.vscode.marketplace_url.clone(),
        )
    }

    /// VSIX download URL for an extension
    pub fn download_url(&self, extension: &Extension) -> String {
        self.marketplace_url
            .replace("{publisher}", &extension.publisher)
            .replace("{name}", &extension.name)
            .replace("{version}", &extension.version)
    }

    /// Directory the VSIX is unpacked into
    pub fn extension_dir(&self, extension: &Extension) -> PathBuf {
        self.cache_dir.join("extensions").join(extension.to_string())
    }

    fn is_cached(&self, extension: &Extension) -> bool {
        self.extension_dir(extension).join("extension").is_dir()
    }
}

#[async_trait]
impl PluginCache for VscodeClient {
    async fn ensure_cached(&self, extension: &Extension) -> EnvResult<()> {
        if self.is_cached(extension) {
            debug!(extension = %extension, "Extension already cached");
            return Ok(());
        }

        let url = self.download_url(extension);
        let target = self.extension_dir(extension);
        let id = extension.to_string();
        info!(extension = %id, "Downloading extension");

        tokio::task::spawn_blocking(move || fetch_and_unpack(&url, &target, &id))
            .await
            .map_err(|e| EnvError::Internal(format!("extension download task failed: {}", e)))?
    }

    fn plugin_path(&self, extension: &Extension) -> String {
        format!("extensions/{}/extension", extension)
    }
}

/// Download the VSIX and unpack it into `target`.
///
/// Unpacks into a sibling staging directory first so an interrupted run
/// never leaves a directory that looks cached.
fn fetch_and_unpack(url: &str, target: &Path, id: &str) -> EnvResult<()> {
    let parent = target
        .parent()
        .ok_or_else(|| EnvError::Internal(format!("no parent for {}", target.display())))?;
    fs::create_dir_all(parent)
        .map_err(|e| EnvError::io(format!("creating {}", parent.display()), e))?;

    let vsix = parent.join(format!("{}.vsix", id));
    let staging = parent.join(format!(".{}.partial", id));
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .map_err(|e| EnvError::io(format!("removing {}", staging.display()), e))?;
    }

    download(url, &vsix, id)?;
    unpack_vsix(&vsix, &staging, id)?;

    if target.exists() {
        fs::remove_dir_all(target)
            .map_err(|e| EnvError::io(format!("removing {}", target.display()), e))?;
    }
    fs::rename(&staging, target)
        .map_err(|e| EnvError::io(format!("moving extension into {}", target.display()), e))?;

    // Best-effort: the unpacked tree is what matters
    let _ = fs::remove_file(&vsix);

    info!(extension = %id, "Extension cached at {}", target.display());
    Ok(())
}

fn download(url: &str, dest: &Path, id: &str) -> EnvResult<()> {
    let fetch_err = |reason: String| EnvError::PluginFetch {
        extension: id.to_string(),
        reason,
    };

    let response = ureq::get(url).call().map_err(|e| fetch_err(e.to_string()))?;
    let mut reader = response.into_body().into_reader();
    let mut file =
        File::create(dest).map_err(|e| EnvError::io(format!("creating {}", dest.display()), e))?;
    std::io::copy(&mut reader, &mut file).map_err(|e| fetch_err(e.to_string()))?;

    debug!("Downloaded {} to {}", url, dest.display());
    Ok(())
}

fn unpack_vsix(archive_path: &Path, dest: &Path, id: &str) -> EnvResult<()> {
    let bad_archive = |reason: String| EnvError::PluginFetch {
        extension: id.to_string(),
        reason,
    };

    let file = File::open(archive_path)
        .map_err(|e| EnvError::io(format!("opening {}", archive_path.display()), e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| bad_archive(format!("invalid VSIX: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| bad_archive(format!("unreadable VSIX entry: {}", e)))?;

        let path = entry
            .enclosed_name()
            .ok_or_else(|| bad_archive(format!("unsafe entry name {}", entry.name())))?;
        let dest_path = dest.join(path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)
                .map_err(|e| EnvError::io(format!("creating {}", dest_path.display()), e))?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| EnvError::io(format!("creating {}", parent.display()), e))?;
        }
        let mut outfile = File::create(&dest_path)
            .map_err(|e| EnvError::io(format!("creating {}", dest_path.display()), e))?;
        std::io::copy(&mut entry, &mut outfile)
            .map_err(|e| EnvError::io(format!("writing {}", dest_path.display()), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode))
                    .map_err(|e| EnvError::io("setting extension file mode", e))?;
            }
        }
    }

    Ok(())
}
