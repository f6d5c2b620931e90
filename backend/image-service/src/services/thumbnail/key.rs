//! Thumbnail cache keys
//!
//! A key is the source's logical path with size tokens inserted between the
//! stem and the extension:
//!
//! | source | size | key |
//! |---|---|---|
//! | `a/photo.jpg` | `200,` | `a/photo_200.jpg` |
//! | `a/photo.jpg` | `200,150` | `a/photo_200_150.jpg` |
//! | `a/photo.jpg` | `,150` | `a/photo__150.jpg` |
//! | `a/photo.jpg` | unset | `a/photo.jpg` |
//!
//! A height-only request keeps an empty width slot so it can never share a
//! key with a width-only request of the same value.

use crate::models::SizeSpec;
use crate::storage::PathParts;
use std::fmt;

/// Logical path of a thumbnail inside the thumbnail store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey(String);

impl ThumbnailKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThumbnailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ThumbnailKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derive the thumbnail key for a normalized source path.
pub fn build_key(source_path: &str, size: &SizeSpec) -> ThumbnailKey {
    let parts = PathParts::split(source_path);
    ThumbnailKey(parts.join_with_suffix(&size_suffix(size)))
}

fn size_suffix(size: &SizeSpec) -> String {
    match (size.width, size.height) {
        (Some(w), Some(h)) => format!("_{w}_{h}"),
        (Some(w), None) => format!("_{w}"),
        (None, Some(h)) => format!("__{h}"),
        (None, None) => String::new(),
    }
}
