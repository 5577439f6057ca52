//! Cartridge shelf: the on-disk collection of loadable cartridges.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::ShelfSettings;

/// One cartridge file found on the shelf.
#[derive(Debug, Clone)]
pub struct CartridgeFile {
    pub path: PathBuf,
    /// File stem, shown in the shelf list.
    pub name: String,
}

fn is_cartridge_file(path: &Path, settings: &ShelfSettings) -> bool {
    let wanted = settings.extension.trim().trim_start_matches('.');
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Scan `dir` for cartridge files, sorted by name.
pub fn scan(dir: &Path, settings: &ShelfSettings) -> Vec<CartridgeFile> {
    let mut cartridges: Vec<CartridgeFile> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_cartridge_file(path, settings)
        {
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();

            cartridges.push(CartridgeFile {
                path: path.to_path_buf(),
                name,
            });
        }
    }

    cartridges.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    cartridges
}
