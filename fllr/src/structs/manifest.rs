use std::path::{Path, PathBuf};

use crate::utils::errors::ConvertError;

/// Upper bound on the number of segments a single conversion may produce.
pub const MAX_SEGMENTS: usize = 1024;

/// Output files produced by a conversion, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputManifest {
    paths: Vec<PathBuf>,
}

impl OutputManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a closed segment. Fails once [`MAX_SEGMENTS`] entries exist.
    pub fn push(&mut self, path: PathBuf) -> Result<(), ConvertError> {
        if self.paths.len() >= MAX_SEGMENTS {
            return Err(ConvertError::TooManySegments { max: MAX_SEGMENTS });
        }
        self.paths.push(path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

impl<'a> IntoIterator for &'a OutputManifest {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

#[test]
fn test_manifest_bound() {
    let mut manifest = OutputManifest::new();
    for i in 0..MAX_SEGMENTS {
        manifest.push(PathBuf::from(format!("out_{i}.flac"))).unwrap();
    }
    assert_eq!(manifest.len(), MAX_SEGMENTS);
    assert!(matches!(
        manifest.push(PathBuf::from("one_too_many.flac")),
        Err(ConvertError::TooManySegments { max: MAX_SEGMENTS })
    ));
    assert_eq!(manifest.paths()[0], Path::new("out_0.flac"));
}
