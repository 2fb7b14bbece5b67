use std::{
    collections::BTreeMap,
    path::{Component, Path, PathBuf},
};

/// Subdirectory of the sound directory that `add` picks new sounds from.
pub const ADD_SUBDIR: &str = "to_add";

/// Sound keywords and the files they play.
#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    directory: PathBuf,
    files: BTreeMap<String, String>,
}

impl SoundLibrary {
    pub fn new(directory: PathBuf, files: BTreeMap<String, String>) -> Self {
        Self { directory, files }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn add_directory(&self) -> PathBuf {
        self.directory.join(ADD_SUBDIR)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.files.contains_key(keyword)
    }

    pub fn resolve(&self, keyword: &str) -> Option<PathBuf> {
        self.files.get(keyword).map(|file| self.directory.join(file))
    }

    /// Registers a keyword unless it is already taken.
    pub fn insert_new(&mut self, keyword: &str, file: &str) -> bool {
        if self.files.contains_key(keyword) {
            return false;
        }
        self.files.insert(keyword.to_string(), file.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `keyword: file` lines for the playlist, extensions dropped.
    pub fn playlist_lines(&self) -> Vec<String> {
        self.files
            .iter()
            .map(|(keyword, file)| format!("{}: {}", keyword, Path::new(file).with_extension("").display()))
            .collect()
    }
}

/// True when `name` is a bare file name, so joining it onto a directory
/// cannot climb out of that directory.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!((components.next(), components.next()), (Some(Component::Normal(_)), None))
}
