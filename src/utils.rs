use dirs::data_dir;
use once_cell::sync::Lazy;
use std::{
    fs,
    path::{Path, PathBuf},
};

static DATA_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    let base = data_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    base.join("fb-event-scrape")
});

pub fn data_root() -> PathBuf {
    DATA_ROOT.clone()
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}

pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
