use thiserror::Error;

/// Fatal construction failures (spec §4.C, §7). Per-feature degeneracies are
/// *not* represented here — they're skipped and counted, not raised.
#[derive(Debug, Error)]
pub enum GraphBuildError {
    #[error("no usable local projection could be derived for this area (empty or degenerate polygon)")]
    ProjectionUnavailable,
    #[error("no street features were usable after validation")]
    NoUsableFeatures,
}
