use std::fs;
use std::io;
use std::path::Path;

/// Directory operations needed to name takes.
pub trait Filesystem: Send + Sync {
    /// File names (not full paths) of the entries in `dir`.
    fn list_directory(&self, dir: &Path) -> io::Result<Vec<String>>;

    fn path_exists(&self, path: &Path) -> bool;

    fn ensure_directory(&self, dir: &Path) -> io::Result<()>;
}

/// `Filesystem` backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn list_directory(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn ensure_directory(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }
}

