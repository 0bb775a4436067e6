use thiserror::Error;

/// Failures of the root finder or of the branch classifier.
///
/// These signal broken internal invariants rather than bad user input, so the
/// sweep aborts instead of skipping the offending input value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("expected 1 to 3 real non-negative equilibria at l = {input}, found {count}")]
    UnexpectedRootCount { input: f64, count: usize },
    #[error("polynomial has a zero leading coefficient")]
    ZeroLeadingCoefficient,
    #[error("polynomial coefficient {index} is not finite ({value})")]
    NonFiniteCoefficient { index: usize, value: f64 },
}
