use thiserror::Error;

/// Fatal assembly failures (spec §4.G). Bounded issues — unresolved gaps,
/// an exhausted oracle budget — are *not* errors here; they're recorded in
/// the result and folded into the pipeline's `completed_with_warnings`
/// status instead (spec §7: "the assembler never raises for bounded issues").
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("eulerization produced no circuits for a non-empty graph")]
    NoCircuits,
}
