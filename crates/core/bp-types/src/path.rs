//! Canonical storage paths.

use bp_error::InputError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage URI scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// Amazon S3 and S3-compatible stores (`s3://`)
    S3,
    /// Google Cloud Storage (`gs://`)
    Gs,
}

impl Scheme {
    /// All supported schemes.
    pub const ALL: [Scheme; 2] = [Scheme::S3, Scheme::Gs];

    /// The scheme name without separator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::S3 => "s3",
            Scheme::Gs => "gs",
        }
    }

    /// The URI prefix for this scheme, e.g. `gs://`.
    pub fn uri_prefix(&self) -> &'static str {
        match self {
            Scheme::S3 => "s3://",
            Scheme::Gs => "gs://",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A folder-like storage path: `scheme://bucket/prefix/`.
///
/// Always canonical: the key prefix is either empty (bucket root) or ends with
/// exactly one `/`. Equality and hashing operate on the canonical form, so
/// `gs://b/a//` and `gs://b/a` are the same folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderPath {
    scheme: Scheme,
    bucket: String,
    prefix: String,
}

impl FolderPath {
    /// Parse and canonicalize a folder path.
    ///
    /// A missing trailing separator is added and repeated trailing separators
    /// are collapsed into one.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let raw = raw.trim();
        let invalid = |reason: &str| InputError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        let (scheme_name, rest) = raw
            .split_once("://")
            .ok_or_else(|| invalid("missing scheme (expected s3:// or gs://)"))?;
        let scheme = Scheme::from_name(scheme_name)
            .ok_or_else(|| invalid("unsupported scheme (expected s3:// or gs://)"))?;

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(invalid("missing bucket name"));
        }
        if bucket.chars().any(char::is_whitespace) {
            return Err(invalid("bucket name contains whitespace"));
        }

        let trimmed = key.trim_end_matches('/');
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };

        Ok(Self {
            scheme,
            bucket: bucket.to_string(),
            prefix,
        })
    }

    /// Create the root folder of a bucket.
    pub fn bucket_root(scheme: Scheme, bucket: impl Into<String>) -> Self {
        Self {
            scheme,
            bucket: bucket.into(),
            prefix: String::new(),
        }
    }

    /// The URI scheme.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// The bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The key prefix inside the bucket (empty for the bucket root).
    pub fn key_prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this path addresses the bucket itself.
    pub fn is_bucket_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Number of folder levels below the bucket root.
    pub fn depth(&self) -> usize {
        self.prefix.matches('/').count()
    }

    /// Address an object named `name` directly inside this folder.
    pub fn join(&self, name: impl Into<String>) -> ObjectUri {
        ObjectUri {
            folder: self.clone(),
            name: name.into(),
        }
    }

    /// Build a sibling path in the same bucket from a full key prefix.
    pub fn with_key_prefix(&self, key_prefix: &str) -> Self {
        let trimmed = key_prefix.trim_end_matches('/');
        Self {
            scheme: self.scheme,
            bucket: self.bucket.clone(),
            prefix: if trimmed.is_empty() {
                String::new()
            } else {
                format!("{trimmed}/")
            },
        }
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", self.scheme.uri_prefix(), self.bucket, self.prefix)
    }
}

impl TryFrom<String> for FolderPath {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FolderPath> for String {
    fn from(path: FolderPath) -> Self {
        path.to_string()
    }
}

/// An object address: a folder plus an object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUri {
    folder: FolderPath,
    name: String,
}

impl ObjectUri {
    /// The containing folder.
    pub fn folder(&self) -> &FolderPath {
        &self.folder
    }

    /// The object name within the folder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bucket name.
    pub fn bucket(&self) -> &str {
        self.folder.bucket()
    }

    /// The full object key inside the bucket.
    pub fn key(&self) -> String {
        format!("{}{}", self.folder.key_prefix(), self.name)
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.folder, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bucket_root() {
        let path = FolderPath::parse("gs://my-bucket/").unwrap();
        assert_eq!(path.scheme(), Scheme::Gs);
        assert_eq!(path.bucket(), "my-bucket");
        assert_eq!(path.key_prefix(), "");
        assert!(path.is_bucket_root());
        assert_eq!(path.to_string(), "gs://my-bucket/");
    }

    #[test]
    fn test_parse_adds_trailing_separator() {
        let path = FolderPath::parse("s3://bucket/data/logs").unwrap();
        assert_eq!(path.key_prefix(), "data/logs/");
        assert_eq!(path.to_string(), "s3://bucket/data/logs/");

        let root = FolderPath::parse("s3://bucket").unwrap();
        assert_eq!(root.to_string(), "s3://bucket/");
    }

    #[test]
    fn test_parse_collapses_trailing_separators() {
        let a = FolderPath::parse("gs://b/a///").unwrap();
        let b = FolderPath::parse("gs://b/a/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "gs://b/a/");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(FolderPath::parse("bucket/folder/").is_err());
        assert!(FolderPath::parse("ftp://bucket/").is_err());
        assert!(FolderPath::parse("gs:///folder/").is_err());
        assert!(FolderPath::parse("gs://my bucket/").is_err());
    }

    #[test]
    fn test_depth() {
        assert_eq!(FolderPath::parse("gs://b/").unwrap().depth(), 0);
        assert_eq!(FolderPath::parse("gs://b/a/").unwrap().depth(), 1);
        assert_eq!(FolderPath::parse("gs://b/a/c/d/").unwrap().depth(), 3);
    }

    #[test]
    fn test_join_object() {
        let folder = FolderPath::parse("gs://bucket/uploads/").unwrap();
        let object = folder.join("testfile");
        assert_eq!(object.bucket(), "bucket");
        assert_eq!(object.key(), "uploads/testfile");
        assert_eq!(object.to_string(), "gs://bucket/uploads/testfile");

        let root = FolderPath::parse("gs://bucket/").unwrap();
        assert_eq!(root.join("testfile").key(), "testfile");
    }

    #[test]
    fn test_with_key_prefix() {
        let root = FolderPath::parse("s3://bucket/").unwrap();
        let child = root.with_key_prefix("a/b/");
        assert_eq!(child.to_string(), "s3://bucket/a/b/");
        assert_eq!(root.with_key_prefix(""), root);
    }

    #[test]
    fn test_serde_as_string() {
        let path = FolderPath::parse("gs://bucket/a").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"gs://bucket/a/\"");

        let parsed: FolderPath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }
}
