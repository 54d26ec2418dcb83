//! Writing the final contract to disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use super::session::Session;
use super::WorkflowError;

/// Prefix of generated output file names.
pub const OUTPUT_PREFIX: &str = "freelance_contract_";

/// `freelance_contract_<YYYYmmdd_HHMMSS>.txt`
pub fn default_output_name(now: DateTime<Local>) -> String {
    format!("{OUTPUT_PREFIX}{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// True if `name` looks like a generated output file name.
pub fn is_default_output_name(name: &str) -> bool {
    let Some(stamp) = name
        .strip_prefix(OUTPUT_PREFIX)
        .and_then(|rest| rest.strip_suffix(".txt"))
    else {
        return false;
    };
    let bytes = stamp.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 8 || b.is_ascii_digit())
}

/// Save into the working directory when no explicit path is given.
pub fn save_contract(session: &Session, path: Option<&Path>) -> Result<PathBuf, WorkflowError> {
    save_contract_in(session, path, Path::new(""))
}

/// Save the final text verbatim. Without an explicit path the file gets a
/// timestamped name inside `base_dir`. Existing files are overwritten.
pub fn save_contract_in(
    session: &Session,
    path: Option<&Path>,
    base_dir: &Path,
) -> Result<PathBuf, WorkflowError> {
    let text = session.final_text().ok_or(WorkflowError::NoFinalContract)?;

    let path = match path {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(default_output_name(Local::now())),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| WorkflowError::Write {
            path: path.clone(),
            source,
        })?;
    }
    std::fs::write(&path, text).map_err(|source| WorkflowError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), bytes = text.len(), "contract saved");
    Ok(path)
}
