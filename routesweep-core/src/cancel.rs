use tokio::sync::watch;

/// Cooperative cancellation signal (spec §5), backed by a `tokio::sync::watch`
/// channel rather than `tokio_util::sync::CancellationToken` since that crate
/// isn't otherwise part of this workspace's dependency stack.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// A token that never cancels, for callers that don't need the feature.
    #[must_use]
    pub fn never() -> Self {
        CancellationSource::new().token()
    }
}

/// The cancelling half; held by the caller, not the pipeline.
#[derive(Debug, Clone)]
pub struct CancellationSource {
    tx: watch::Sender<bool>,
}

impl CancellationSource {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    #[must_use]
    pub fn token(&self) -> CancellationToken {
        CancellationToken { rx: self.tx.subscribe() }
    }

    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}
