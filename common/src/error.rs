use crate::parse::ParseVectorError;

/// The failures of the vector operations in [`ops`](crate::ops) and
/// [`Vector`](crate::vector::Vector).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    /// The two operands do not have the same number of components.
    #[error("the two vectors must be of equal dimension, got {left} and {right}")]
    DimensionMismatch {
        /// The length of the left operand.
        left: usize,
        /// The length of the right operand.
        right: usize,
    },
    /// The operation is only defined for a single dimension, e.g. the cross product.
    #[error("operation is only defined for {expected}-vectors, got a {found}-vector")]
    UnsupportedDimension {
        /// The dimension the operation is defined for.
        expected: usize,
        /// The dimension of the operands.
        found: usize,
    },
    /// A vector of zero magnitude has no direction to normalize to.
    #[error("cannot normalize a vector of zero magnitude")]
    ZeroVector,
    /// The vector literal could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseVectorError),
}
