use thiserror::Error;

/// Fatal eulerization failures (spec §4.D, §7). Both should be unreachable
/// given a correctly constructed graph; they exist to surface a bug in SCC
/// extraction or graph construction rather than silently producing a bad route.
#[derive(Debug, Error)]
pub enum EulerizationError {
    #[error("SCC contains edges but is not strongly connected")]
    NotStronglyConnected,
    #[error("demand unreachable from any supply node during balancing")]
    FlowInfeasible,
}
