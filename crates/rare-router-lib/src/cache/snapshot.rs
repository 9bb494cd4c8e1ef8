use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::system::{normalize_name, ResolvedSystem};

/// Read the `{lowercase name: system}` snapshot.
///
/// A missing file is an empty snapshot. An unreadable one is logged and
/// ignored so a corrupt cache never blocks startup.
pub fn load(path: &Path) -> HashMap<String, ResolvedSystem> {
    if !path.exists() {
        return HashMap::new();
    }

    match read(path) {
        Ok(systems) => {
            info!(
                path = %path.display(),
                systems = systems.len(),
                "loaded system snapshot"
            );
            systems
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                error = %err,
                "could not load system snapshot, starting fresh"
            );
            HashMap::new()
        }
    }
}

fn read(path: &Path) -> Result<HashMap<String, ResolvedSystem>> {
    let contents = fs::read_to_string(path)?;
    let raw: HashMap<String, ResolvedSystem> = serde_json::from_str(&contents)?;
    Ok(raw
        .into_iter()
        .map(|(key, system)| (normalize_name(&key), system))
        .collect())
}

/// Atomically replace the snapshot at `path`.
///
/// The JSON is written to a temporary file in the same directory and renamed
/// over the target, so readers see either the old or the new file.
pub fn write(path: &Path, systems: &HashMap<String, ResolvedSystem>) -> Result<()> {
    write_inner(path, systems).map_err(|err| Error::CachePersistence {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

fn write_inner(path: &Path, systems: &HashMap<String, ResolvedSystem>) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let ordered: BTreeMap<&str, &ResolvedSystem> = systems
        .iter()
        .map(|(key, system)| (key.as_str(), system))
        .collect();

    let mut tmp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, &ordered)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
