//! Progress reporting around long-running generation.

/// Receives start and end notifications for one generation.
///
/// The binary renders these as a spinner; library callers that do not
/// need feedback pass [`NoopProgress`].
pub trait ProgressReporter {
    /// Called before generation with a message such as
    /// `Generating the [kubectl] CLI tree`.
    fn begin(&self, message: &str);

    /// Called after generation with its outcome.
    fn finish(&self, success: bool);
}

/// Reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn begin(&self, _message: &str) {}

    fn finish(&self, _success: bool) {}
}
