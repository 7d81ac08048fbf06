use thiserror::Error;

use crate::result::Diagnostics;

/// Errors the pipeline surfaces to its caller (spec §4.G, §7). Everything
/// else — degenerate features, unresolved gaps, an exhausted oracle budget —
/// is folded into [`crate::result::GenerateResult::diagnostics`] and
/// [`crate::result::Status`] instead; this enum exists only for contract
/// violations where returning a route at all would be misleading.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no usable local projection could be derived for this area")]
    ProjectionUnavailable,
    /// Should not occur by construction (spec §7): either eulerization
    /// couldn't balance an SCC, or assembly produced no circuits for a
    /// non-empty graph. Both indicate a bug upstream, not a property of the
    /// input. Carries every diagnostics field known up to the point of
    /// failure (spec §7: "return `failed` with full diagnostics"), with
    /// whatever a later stage would have filled in left at its default.
    #[error("internal invariant violated: {message}")]
    FlowInfeasible {
        message: String,
        diagnostics: Box<Diagnostics>,
    },
    #[error("cancelled")]
    Cancelled,
}

impl PipelineError {
    pub(crate) fn flow_infeasible(err: impl std::fmt::Display, diagnostics: Diagnostics) -> Self {
        PipelineError::FlowInfeasible {
            message: err.to_string(),
            diagnostics: Box::new(diagnostics),
        }
    }
}

/// Graph construction's own failure modes map onto the pipeline's taxonomy:
/// an unusable projection is `ProjectionUnavailable` fail-fast, while "every
/// feature turned out degenerate" is really just another shape of invalid
/// input (spec §7).
impl From<routesweep_graph::GraphBuildError> for PipelineError {
    fn from(err: routesweep_graph::GraphBuildError) -> Self {
        match err {
            routesweep_graph::GraphBuildError::ProjectionUnavailable => PipelineError::ProjectionUnavailable,
            routesweep_graph::GraphBuildError::NoUsableFeatures => {
                PipelineError::InvalidInput("no street feature remained usable after validation".into())
            }
        }
    }
}
