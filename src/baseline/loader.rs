// Snapshot provider: builds a Baseline from serialized components

use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, trace};
use walkdir::WalkDir;

use super::{Baseline, BaselineError, Snapshot, SNAPSHOT_VERSION};
use crate::model::Component;

/// Serialization format of a snapshot file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotFormat {
    Json,
    Yaml,
    Toml,
}

impl SnapshotFormat {
    /// Determine the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SnapshotFormat::Json),
            "yml" | "yaml" => Some(SnapshotFormat::Yaml),
            "toml" => Some(SnapshotFormat::Toml),
            _ => None,
        }
    }

    fn parse<T: DeserializeOwned>(&self, path: &Path, contents: &str) -> Result<T, BaselineError> {
        let parsed = match self {
            SnapshotFormat::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
            SnapshotFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| e.to_string()),
            SnapshotFormat::Toml => toml::from_str(contents).map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| BaselineError::ParseError {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Loads a baseline from a snapshot file or a directory of component files
#[derive(Debug, Default)]
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load the baseline at `location`.
    ///
    /// A file holds a whole [`Snapshot`]; a directory holds one component
    /// per file, read in path order.
    pub fn load(&self, location: &Path) -> Result<Baseline, BaselineError> {
        if !location.exists() {
            return Err(BaselineError::NotFound(location.to_path_buf()));
        }

        let baseline = if location.is_dir() {
            self.load_directory(location)?
        } else {
            self.load_file(location)?
        };

        info!(
            "Loaded baseline '{}' with {} components",
            baseline.name(),
            baseline.len()
        );
        Ok(baseline)
    }

    fn load_file(&self, path: &Path) -> Result<Baseline, BaselineError> {
        let format = SnapshotFormat::from_path(path)
            .ok_or_else(|| BaselineError::UnsupportedFormat(path.to_path_buf()))?;
        let contents = read(path)?;
        let snapshot: Snapshot = format.parse(path, &contents)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(BaselineError::VersionMismatch {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let name = if snapshot.name.is_empty() {
            file_stem(path)
        } else {
            snapshot.name
        };
        Ok(Baseline::new(name, attach(snapshot.components)))
    }

    fn load_directory(&self, root: &Path) -> Result<Baseline, BaselineError> {
        debug!("Scanning for component snapshots in: {}", root.display());

        let mut files: Vec<_> = WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| SnapshotFormat::from_path(path).is_some())
            .collect();
        files.sort();

        let mut components = Vec::with_capacity(files.len());
        for path in &files {
            trace!("Reading component snapshot {}", path.display());
            let format = SnapshotFormat::from_path(path)
                .ok_or_else(|| BaselineError::UnsupportedFormat(path.clone()))?;
            let contents = read(path)?;
            components.push(format.parse::<Component>(path, &contents)?);
        }

        Ok(Baseline::new(file_stem(root), attach(components)))
    }
}

fn read(path: &Path) -> Result<String, BaselineError> {
    std::fs::read_to_string(path).map_err(|source| BaselineError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "baseline".to_string())
}

fn attach(mut components: Vec<Component>) -> Vec<Component> {
    for component in &mut components {
        component.attach_members();
    }
    components
}
