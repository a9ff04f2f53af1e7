//! Diagnostic screenshot sinks.
//!
//! The toast poller records a screenshot per successful sample and one on
//! terminal failure. The sink is injected so suites can disable capture
//! for speed without touching poller logic.

use std::path::{Path, PathBuf};

use crate::result::ForoResult;

/// Receiver for diagnostic screenshots
pub trait DiagnosticSink: Send + Sync {
    /// Record a PNG capture under the given tag.
    ///
    /// Implementations must not fail the calling test: persistence errors
    /// are logged and swallowed.
    fn capture(&self, tag: &str, png: &[u8]);
}

/// Sink that discards all captures
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDiagnostics;

impl DiagnosticSink for NullDiagnostics {
    fn capture(&self, _tag: &str, _png: &[u8]) {}
}

/// Sink that writes captures as `<dir>/<tag>.png`
#[derive(Debug, Clone)]
pub struct FsDiagnostics {
    dir: PathBuf,
}

impl FsDiagnostics {
    /// Create a sink writing into `dir`, creating it if needed
    pub fn new(dir: impl AsRef<Path>) -> ForoResult<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    /// Target path for a tag
    #[must_use]
    pub fn path_for(&self, tag: &str) -> PathBuf {
        self.dir.join(format!("{tag}.png"))
    }
}

impl DiagnosticSink for FsDiagnostics {
    fn capture(&self, tag: &str, png: &[u8]) {
        let path = self.path_for(tag);
        if let Err(e) = std::fs::write(&path, png) {
            tracing::warn!(tag, path = %path.display(), error = %e, "failed to persist screenshot");
        } else {
            tracing::debug!(tag, path = %path.display(), "screenshot saved");
        }
    }
}
