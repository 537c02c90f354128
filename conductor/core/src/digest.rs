//! File Digest Extraction
//!
//! Turns attached files into bounded text snippets that can be embedded in a
//! prompt. Large files are never read; binary-looking files are replaced with
//! a placeholder; text is cut to the first [`MAX_SNIPPET_CHARS`] characters.
//!
//! Binary detection is a heuristic: the bytes are decoded lossily as UTF-8 and
//! any U+FFFD replacement character marks the file as binary. A text file that
//! genuinely contains U+FFFD is therefore reported as binary too.

use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Files larger than this many bytes are not read
pub const MAX_DIGEST_FILE_BYTES: u64 = 1024 * 1024;

/// Maximum number of characters kept from a text file
pub const MAX_SNIPPET_CHARS: usize = 5000;

/// Placeholder for files whose content is not valid text
pub const BINARY_PLACEHOLDER: &str = "[Binary file content not readable]";

/// A bounded excerpt of an attached file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSnippet {
    /// File name (no directory)
    pub name: String,
    /// Excerpt or placeholder
    pub content: String,
}

/// Snippet for a file over the size limit
#[must_use]
pub fn oversized(name: impl Into<String>, size_bytes: u64) -> FileSnippet {
    #[allow(clippy::cast_precision_loss)]
    let megabytes = size_bytes as f64 / (1024.0 * 1024.0);
    FileSnippet {
        name: name.into(),
        content: format!("[File is too large to read content ({megabytes:.2} MB)]"),
    }
}

/// Snippet for a file whose bytes are already in memory
///
/// The caller is responsible for the size check.
#[must_use]
pub fn digest_bytes(name: impl Into<String>, bytes: &[u8]) -> FileSnippet {
    let text = String::from_utf8_lossy(bytes);

    let content = if text.contains('\u{FFFD}') {
        BINARY_PLACEHOLDER.to_string()
    } else {
        text.chars().take(MAX_SNIPPET_CHARS).collect()
    };

    FileSnippet {
        name: name.into(),
        content,
    }
}

/// File name component used as the snippet name
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Digest a single file from disk
///
/// # Errors
///
/// Returns [`GenerationError::Digest`] if the file metadata or content cannot
/// be read.
pub async fn digest_file(path: &Path) -> Result<FileSnippet, GenerationError> {
    let to_err = |source| GenerationError::Digest {
        path: path.to_path_buf(),
        source,
    };

    let name = display_name(path);
    let size = tokio::fs::metadata(path).await.map_err(to_err)?.len();

    if size > MAX_DIGEST_FILE_BYTES {
        tracing::debug!(file = %name, size, "File too large, skipping content");
        return Ok(oversized(name, size));
    }

    let bytes = tokio::fs::read(path).await.map_err(to_err)?;
    Ok(digest_bytes(name, &bytes))
}

/// Digest every file concurrently
///
/// Fails fast: the first error aborts the batch and no partial result is
/// returned.
///
/// # Errors
///
/// Returns the first [`GenerationError::Digest`] encountered.
pub async fn digest_all(paths: &[PathBuf]) -> Result<Vec<FileSnippet>, GenerationError> {
    try_join_all(paths.iter().map(|p| digest_file(p))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file_with(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_text_is_truncated_to_limit() {
        let text = "x".repeat(MAX_SNIPPET_CHARS + 100);
        let snippet = digest_bytes("notes.txt", text.as_bytes());
        assert_eq!(snippet.name, "notes.txt");
        assert_eq!(snippet.content.chars().count(), MAX_SNIPPET_CHARS);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "é".repeat(MAX_SNIPPET_CHARS + 1);
        let snippet = digest_bytes("accents.txt", text.as_bytes());
        assert_eq!(snippet.content, "é".repeat(MAX_SNIPPET_CHARS));
    }

    #[test]
    fn test_short_text_is_kept_whole() {
        let snippet = digest_bytes("readme.md", b"# Hello\nworld\n");
        assert_eq!(snippet.content, "# Hello\nworld\n");
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        let snippet = digest_bytes("logo.png", &[0x89, b'P', b'N', b'G', 0xFF, 0xFE]);
        assert_eq!(snippet.content, BINARY_PLACEHOLDER);
    }

    #[test]
    fn test_literal_replacement_character_is_treated_as_binary() {
        let snippet = digest_bytes("odd.txt", "before \u{FFFD} after".as_bytes());
        assert_eq!(snippet.content, BINARY_PLACEHOLDER);
    }

    #[test]
    fn test_oversized_message() {
        let snippet = oversized("disk.img", 3 * 1024 * 1024 + 512 * 1024);
        assert_eq!(
            snippet.content,
            "[File is too large to read content (3.50 MB)]"
        );
    }

    #[tokio::test]
    async fn test_file_one_byte_over_limit_is_not_read() {
        let size = usize::try_from(MAX_DIGEST_FILE_BYTES).unwrap() + 1;
        let file = temp_file_with(&vec![b'a'; size]);

        let snippet = digest_file(file.path()).await.unwrap();
        assert_eq!(
            snippet.content,
            "[File is too large to read content (1.00 MB)]"
        );
    }

    #[tokio::test]
    async fn test_file_exactly_at_limit_is_read() {
        let size = usize::try_from(MAX_DIGEST_FILE_BYTES).unwrap();
        let file = temp_file_with(&vec![b'a'; size]);

        let snippet = digest_file(file.path()).await.unwrap();
        assert_eq!(snippet.content, "a".repeat(MAX_SNIPPET_CHARS));
        assert_eq!(snippet.name, display_name(file.path()));
    }

    #[tokio::test]
    async fn test_digest_all_preserves_order() {
        let first = temp_file_with(b"first");
        let second = temp_file_with(b"second");
        let paths = vec![first.path().to_path_buf(), second.path().to_path_buf()];

        let snippets = digest_all(&paths).await.unwrap();
        let contents: Vec<_> = snippets.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_digest_all_fails_fast_on_missing_file() {
        let present = temp_file_with(b"here");
        let paths = vec![
            present.path().to_path_buf(),
            PathBuf::from("/definitely/not/here.txt"),
        ];

        let err = digest_all(&paths).await.unwrap_err();
        assert!(matches!(err, GenerationError::Digest { ref path, .. } if path.ends_with("here.txt")));
    }
}
