//! Script Export
//!
//! Packages a generated build script as a downloadable shell-script file.
//! The artifact always carries the script exactly as it was received, never
//! the rendered playback.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// MIME type of an exported script
pub const SCRIPT_MIME_TYPE: &str = "text/x-shellscript;charset=utf-8";

fn separator_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[\s_/\\:*?"<>|\x00-\x1f]+"#).expect("valid separator pattern")
    })
}

/// File name for a script built from `codename`
///
/// Runs of whitespace and underscores become `-`, and so do path separators
/// and other characters that are not valid in a file name: `"Aurora Shell"`
/// becomes `build-aurora-shell.sh`, `"OS/2 Reborn"` becomes
/// `build-os-2-reborn.sh`.
#[must_use]
pub fn script_file_name(codename: &str) -> String {
    let lowered = codename.to_lowercase();
    let slug = separator_runs().replace_all(&lowered, "-");
    format!("build-{slug}.sh")
}

/// A script ready to be saved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptArtifact {
    /// Suggested file name
    pub file_name: String,
    /// MIME type
    pub mime_type: &'static str,
    /// Original script text
    pub contents: String,
}

impl ScriptArtifact {
    /// Package `script` under a name derived from `codename`
    pub fn new(codename: &str, script: impl Into<String>) -> Self {
        Self {
            file_name: script_file_name(codename),
            mime_type: SCRIPT_MIME_TYPE,
            contents: script.into(),
        }
    }

    /// Write the artifact into `dir`, creating the directory if needed
    ///
    /// Returns the path written. An existing file of the same name is
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an IO error if the directory cannot be created or the file
    /// cannot be written, and an `InvalidInput` error if `file_name` is not a
    /// single path component.
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        if Path::new(&self.file_name).file_name() != Some(OsStr::new(&self.file_name)) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{:?} is not a plain file name", self.file_name),
            ));
        }

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, self.contents.as_bytes()).await?;

        tracing::info!(path = %path.display(), bytes = self.contents.len(), "Exported build script");
        Ok(path)
    }
}
