//! Descriptor files on disk
//!
//! Supported formats, chosen by extension:
//! - `json`
//! - `yaml` / `yml`
//! - `toml`
//!
//! A file holds a single descriptor, a list of descriptors, or a table with
//! a `descriptors` list (the only list form TOML can express at top level).

use super::DescriptorProvider;
use crate::error::DescriptorError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use workitems_model::WorkItemDescriptor;

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorFile {
    Wrapped { descriptors: Vec<WorkItemDescriptor> },
    Many(Vec<WorkItemDescriptor>),
    One(WorkItemDescriptor),
}

impl DescriptorFile {
    fn into_vec(self) -> Vec<WorkItemDescriptor> {
        match self {
            Self::Wrapped { descriptors } | Self::Many(descriptors) => descriptors,
            Self::One(descriptor) => vec![descriptor],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    fn parse(self, path: &Path, content: &str) -> Result<Vec<WorkItemDescriptor>, DescriptorError> {
        let file: DescriptorFile = match self {
            Self::Json => {
                serde_json::from_str(content).map_err(|e| DescriptorError::malformed(path, e))?
            }
            Self::Yaml => {
                serde_yaml::from_str(content).map_err(|e| DescriptorError::malformed(path, e))?
            }
            Self::Toml => toml::from_str(content).map_err(|e| DescriptorError::malformed(path, e))?,
        };
        Ok(file.into_vec())
    }
}

/// Descriptor source reading a file or a directory of files
///
/// Directory entries are read in file name order; files with other
/// extensions are skipped.
#[derive(Debug, Clone)]
pub struct FileDescriptorProvider {
    root: PathBuf,
}

impl FileDescriptorProvider {
    /// Create provider for a file or directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Configured root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_file(path: &Path) -> Result<Vec<WorkItemDescriptor>, DescriptorError> {
        let format = Format::from_path(path)
            .ok_or_else(|| DescriptorError::UnsupportedFormat(path.to_path_buf()))?;

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DescriptorError::io_error(path, e))?;

        format.parse(path, &content)
    }

    async fn read_dir(dir: &Path) -> Result<Vec<WorkItemDescriptor>, DescriptorError> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| DescriptorError::io_error(dir, e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DescriptorError::io_error(dir, e))?
        {
            let path = entry.path();
            if Format::from_path(&path).is_some() {
                files.push(path);
            } else {
                tracing::debug!("Skipping non-descriptor file: {}", path.display());
            }
        }
        files.sort();

        let mut descriptors = Vec::new();
        for file in files {
            descriptors.extend(Self::read_file(&file).await?);
        }
        Ok(descriptors)
    }
}

#[async_trait]
impl DescriptorProvider for FileDescriptorProvider {
    async fn load_all(&self) -> Result<Vec<WorkItemDescriptor>, DescriptorError> {
        let metadata = tokio::fs::metadata(&self.root)
            .await
            .map_err(|e| DescriptorError::io_error(&self.root, e))?;

        let descriptors = if metadata.is_dir() {
            Self::read_dir(&self.root).await?
        } else {
            Self::read_file(&self.root).await?
        };

        tracing::debug!(
            "Read {} descriptors from {}",
            descriptors.len(),
            self.root.display()
        );
        Ok(descriptors)
    }
}
