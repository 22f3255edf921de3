use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "sitecast_cache";

pub(crate) fn get_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join(CACHE_DIR_NAME))
}

pub(crate) async fn ensure_cache_dir_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if !metadata.is_dir() => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "cache path exists but is not a directory: {}",
                path.display()
            ),
        )),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => tokio::fs::create_dir_all(path).await,
        Err(e) => Err(e),
    }
}
