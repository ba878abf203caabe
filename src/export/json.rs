//! JSON import/export of single subjects.
//! A subject is written with all of its topics, quiz history and notes, so it
//! can be moved between installations or owners.

use crate::error::StoreResult;
use crate::models::Subject;
use log::info;
use std::fs;
use std::path::Path;

/// Exports a subject to a pretty-printed JSON file at the specified path.
pub fn export_subject_to_path<P: AsRef<Path>>(subject: &Subject, path: P) -> StoreResult<()> {
    let json_string = serde_json::to_string_pretty(subject)?;
    fs::write(path.as_ref(), json_string)?;
    info!(
        "subject '{}' exported to '{}'",
        subject.name,
        path.as_ref().display()
    );
    Ok(())
}

/// Imports a subject from a JSON file.
/// Malformed documents and invalid quiz attempts are rejected.
pub fn import_subject<P: AsRef<Path>>(path: P) -> StoreResult<Subject> {
    let contents = fs::read_to_string(path.as_ref())?;
    let subject = Subject::from_json(&contents)?;

    info!(
        "subject '{}' imported from '{}'",
        subject.name,
        path.as_ref().display()
    );
    Ok(subject)
}
