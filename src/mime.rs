//! MIME classification seam.
//!
//! The record core never inspects file contents; type inference and the
//! installable/blocked policy belong to the hosting application. It reaches
//! them through [`MimeClassifier`], with [`ExtensionClassifier`] as a
//! reasonable extension-based default.

use std::collections::HashSet;

/// Fallback MIME type when nothing better can be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// External collaborator that classifies attachment content types.
pub trait MimeClassifier {
    /// Resolve a usable MIME type from a file name and a declared type.
    /// Must always return something; [`OCTET_STREAM`] is the fallback.
    fn infer(&self, name: Option<&str>, declared: Option<&str>) -> String;

    /// Whether the type is an installable package the platform handles
    /// specially (installed rather than saved).
    fn is_installable(&self, content_type: &str) -> bool;

    /// Whether policy forbids saving attachments of this type.
    fn is_blocked(&self, content_type: &str) -> bool;
}

/// Extension-based classifier: trusts a concrete declared type, falls back to
/// guessing from the file name extension, then to [`OCTET_STREAM`].
#[derive(Debug, Clone, Default)]
pub struct ExtensionClassifier {
    installable: HashSet<String>,
    blocked: HashSet<String>,
}

impl ExtensionClassifier {
    /// Classifier with explicit installable and blocked type sets.
    pub fn new<I, B>(installable: I, blocked: B) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            installable: installable.into_iter().map(Into::into).collect(),
            blocked: blocked.into_iter().map(Into::into).collect(),
        }
    }
}

impl MimeClassifier for ExtensionClassifier {
    fn infer(&self, name: Option<&str>, declared: Option<&str>) -> String {
        // A concrete declared type wins; octet-stream is treated as "unknown"
        // and re-inferred from the name.
        if let Some(declared) = declared {
            if !declared.is_empty() && declared != OCTET_STREAM {
                return declared.to_string();
            }
        }
        if let Some(name) = name {
            if let Some(guess) = mime_guess::from_path(name).first() {
                return guess.essence_str().to_string();
            }
        }
        declared
            .filter(|d| !d.is_empty())
            .unwrap_or(OCTET_STREAM)
            .to_string()
    }

    fn is_installable(&self, content_type: &str) -> bool {
        self.installable.contains(content_type)
    }

    fn is_blocked(&self, content_type: &str) -> bool {
        self.blocked.contains(content_type)
    }
}
