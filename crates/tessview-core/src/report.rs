/// Diagnostic channel for recoverable gaps (missing frames, empty panels).
///
/// Illustrations report through an injected reporter instead of failing, so
/// a long animation is not aborted by one ragged sequence. All methods have
/// default no-op implementations.
pub trait Reporter: Send + Sync {
    /// Routine progress message.
    fn info(&self, _message: &str) {}

    /// Something was skipped or degraded but rendering continues.
    fn warning(&self, _message: &str) {}
}

/// Forwards messages to `tracing`, tagged with an optional prefix.
#[derive(Clone, Debug, Default)]
pub struct TracingReporter {
    pub prefix: Option<String>,
}

impl TracingReporter {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        match &self.prefix {
            Some(prefix) => tracing::info!(source = %prefix, "{message}"),
            None => tracing::info!("{message}"),
        }
    }

    fn warning(&self, message: &str) {
        match &self.prefix {
            Some(prefix) => tracing::warn!(source = %prefix, "{message}"),
            None => tracing::warn!("{message}"),
        }
    }
}

/// Mutes everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentReporter;
impl Reporter for SilentReporter {}
