use super::{StorageError, StorageResult};

/// Normalize a request path into a store-relative logical path.
///
/// Leading slashes, empty segments and `.` segments are dropped; `..` is
/// rejected so a path can never escape the store root.
pub fn normalize_logical_path(raw: &str) -> StorageResult<String> {
    let mut segments = Vec::new();
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(StorageError::InvalidPath(raw.to_string())),
            s if s.contains('\0') => return Err(StorageError::InvalidPath(raw.to_string())),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(StorageError::InvalidPath(raw.to_string()));
    }

    Ok(segments.join("/"))
}

/// A logical path split into directory segments, file stem and extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub dirs: Vec<String>,
    pub stem: String,
    pub extension: Option<String>,
}

impl PathParts {
    /// Split an already-normalized logical path.
    pub fn split(logical_path: &str) -> Self {
        let mut dirs: Vec<String> = logical_path.split('/').map(str::to_string).collect();
        let file_name = dirs.pop().unwrap_or_default();

        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem.to_string(), Some(ext.to_string())),
            None => (file_name, None),
        };

        Self {
            dirs,
            stem,
            extension,
        }
    }

    /// Reassemble into a logical path with `suffix` appended to the stem.
    pub fn join_with_suffix(&self, suffix: &str) -> String {
        let mut file_name = format!("{}{}", self.stem, suffix);
        if let Some(ext) = &self.extension {
            file_name.push('.');
            file_name.push_str(ext);
        }

        if self.dirs.is_empty() {
            file_name
        } else {
            format!("{}/{}", self.dirs.join("/"), file_name)
        }
    }
}
