//! Confirmation callouts used when a sync step would discard changes.

/// Answers the questions the engine asks before overwriting local files or
/// uploading over newer server content.
///
/// The engine never asks when it runs forced.
pub trait Confirm {
    /// Asked before a download replaces a local file. `reason` completes the
    /// sentence started by `path`, e.g. "has been modified on server".
    fn confirm_overwrite(&mut self, path: &str, reason: &str) -> bool;

    /// Asked before an upload replaces content changed on the server.
    fn confirm_upload(&mut self, path: &str, reason: &str) -> bool;
}

/// Says yes to everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm_overwrite(&mut self, _path: &str, _reason: &str) -> bool {
        true
    }

    fn confirm_upload(&mut self, _path: &str, _reason: &str) -> bool {
        true
    }
}
