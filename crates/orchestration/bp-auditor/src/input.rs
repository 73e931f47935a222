//! Loading the list of roots to audit.

use bp_error::{InputError, Result};
use bp_types::{FolderPath, Scheme};
use std::path::Path;
use tracing::debug;

/// Parse a newline-delimited roots list.
///
/// Blank lines and lines starting with `#` are skipped. Every other line must
/// start with a supported scheme prefix and end with `/`; the first line that
/// does not is reported with its 1-based line number.
pub fn parse_roots(text: &str) -> std::result::Result<Vec<FolderPath>, InputError> {
    let mut roots = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let entry = raw.trim();
        if entry.is_empty() || entry.starts_with('#') {
            continue;
        }

        let malformed = |reason: String| InputError::Malformed {
            line,
            entry: entry.to_string(),
            reason,
        };

        if !Scheme::ALL.iter().any(|s| entry.starts_with(s.uri_prefix())) {
            let expected: Vec<&str> = Scheme::ALL.iter().map(|s| s.uri_prefix()).collect();
            return Err(malformed(format!(
                "expected a {} prefix",
                expected.join(" or ")
            )));
        }
        if !entry.ends_with('/') {
            return Err(malformed("folder paths must end with '/'".to_string()));
        }

        let root = FolderPath::parse(entry).map_err(|e| malformed(e.to_string()))?;
        roots.push(root);
    }

    Ok(roots)
}

/// Read and parse the roots file at `path`.
///
/// An input without any root is rejected.
pub async fn load_roots(path: impl AsRef<Path>) -> Result<Vec<FolderPath>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InputError::Io(format!("{}: {e}", path.display())))?;

    let roots = parse_roots(&text)?;
    if roots.is_empty() {
        return Err(InputError::Empty(path.display().to_string()).into());
    }

    debug!(path = %path.display(), roots = roots.len(), "Loaded roots");
    Ok(roots)
}
