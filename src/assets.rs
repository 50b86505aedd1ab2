use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;

use crate::error::{PreviewError, PreviewResult};

pub mod decode;

/// Normalized reference to an image asset, relative to an asset root.
///
/// The normalized form uses `/` separators, drops `.` segments, and rejects
/// absolute paths or parent traversals (`..`), so the same asset always maps
/// to the same cache key regardless of the platform the ref was written on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef {
    source: String,
}

impl ImageRef {
    pub fn new(source: impl AsRef<str>) -> PreviewResult<Self> {
        let s = source.as_ref().replace('\\', "/");
        if s.starts_with('/') {
            return Err(PreviewError::validation("asset paths must be relative"));
        }
        if s.is_empty() {
            return Err(PreviewError::validation("asset path must be non-empty"));
        }

        let mut out = Vec::<&str>::new();
        for part in s.split('/') {
            if part.is_empty() || part == "." {
                continue;
            }
            if part == ".." {
                return Err(PreviewError::validation("asset paths must not contain '..'"));
            }
            out.push(part);
        }

        if out.is_empty() {
            return Err(PreviewError::validation(
                "asset path must contain a file name",
            ));
        }

        Ok(Self {
            source: out.join("/"),
        })
    }

    /// Wrap a compile-time ref that is already in normalized form.
    pub(crate) fn known(source: &'static str) -> Self {
        debug_assert!(Self::new(source).is_ok_and(|r| r.source == source));
        Self {
            source: source.to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_svg(&self) -> bool {
        self.source
            .rsplit('.')
            .next()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s).map_err(|e| e.to_string())
    }
}

impl From<ImageRef> for String {
    fn from(r: ImageRef) -> Self {
        r.source
    }
}

/// Prepared raster image in row-major premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Supplies raw asset bytes for an [`ImageRef`].
///
/// The cache is agnostic to where bytes come from; tests substitute an
/// in-memory implementation.
pub trait AssetFetcher {
    fn fetch(&self, image_ref: &ImageRef) -> PreviewResult<Vec<u8>>;
}

/// Filesystem-backed fetcher rooted at an asset directory.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetFetcher for FsFetcher {
    fn fetch(&self, image_ref: &ImageRef) -> PreviewResult<Vec<u8>> {
        let path = self.root.join(image_ref.source());
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read asset '{}'", path.display()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_normalize_separators_to_one_key() {
        let a = ImageRef::new("designs/logo.svg").unwrap();
        let b = ImageRef::new("designs\\logo.svg").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.source(), "designs/logo.svg");

        let dotted = ImageRef::new("./designs//logo.svg").unwrap();
        assert_eq!(dotted, a);
    }

    #[test]
    fn refs_reject_absolute_and_traversal() {
        assert!(ImageRef::new("/etc/passwd").is_err());
        assert!(ImageRef::new("../outside.png").is_err());
        assert!(ImageRef::new("").is_err());
        assert!(ImageRef::new("./").is_err());
    }

    #[test]
    fn svg_detection_is_extension_based() {
        assert!(ImageRef::new("a/b.SVG").unwrap().is_svg());
        assert!(!ImageRef::new("a/b.jpg").unwrap().is_svg());
    }
}
