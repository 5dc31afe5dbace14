use std::path::PathBuf;

use brisk_optimizer::DEFAULT_CACHE_DIR;

pub fn default_root() -> PathBuf {
    PathBuf::from(".")
}

pub fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_port() -> u16 {
    3000
}

pub fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

pub fn default_index_html() -> PathBuf {
    PathBuf::from("index.html")
}

pub fn default_mode() -> String {
    "development".to_string()
}
