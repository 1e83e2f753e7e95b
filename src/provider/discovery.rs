use std::path::{Path, PathBuf};

use glob::glob;
use log::warn;

use crate::err::Result;

/// Expands `search_path` and keeps the paths which contain `data_suffix` but not `mask_suffix`.
/// Entries the glob walker couldn't read are skipped.
pub fn find_data_files(search_path: &str, data_suffix: &str, mask_suffix: &str) -> Result<Vec<PathBuf>> {
    let files = glob(search_path)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path : {}", e);
                None
            }
        })
        .filter(|path| is_data_file(path, data_suffix, mask_suffix))
        .collect();

    Ok(files)
}

pub fn is_data_file(path: &Path, data_suffix: &str, mask_suffix: &str) -> bool {
    let name = path.to_string_lossy();

    name.contains(data_suffix) && !name.contains(mask_suffix)
}

/// Mask path for a data path: every occurrence of `data_suffix` is replaced by `mask_suffix`
pub fn mask_path_for(path: &Path, data_suffix: &str, mask_suffix: &str) -> PathBuf {
    PathBuf::from(path.to_string_lossy().replace(data_suffix, mask_suffix))
}
