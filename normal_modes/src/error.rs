use common::error::VectorError;

/// The failures of building a mechanical system, decomposing it into normal modes, and
/// evaluating its trajectory.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModalError {
    /// An operand has the wrong length, or a matrix is not square.
    #[error("{what} has dimension {found}, expected {expected}")]
    DimensionMismatch {
        /// The operand that has the wrong shape.
        what: &'static str,
        /// The dimension required by the other operands.
        expected: usize,
        /// The dimension that was supplied.
        found: usize,
    },
    /// A system needs at least one degree of freedom.
    #[error("system has no degrees of freedom")]
    EmptySystem,
    /// A mass is zero or negative, so the mass matrix cannot be inverted.
    #[error("mass {index} is {mass}, masses must be strictly positive")]
    SingularMassMatrix {
        /// The degree of freedom with the bad mass.
        index: usize,
        /// The offending mass.
        mass: f64,
    },
    /// The mass matrix has a non-zero off-diagonal entry.
    #[error("mass matrix entry ({row}, {col}) is non-zero, masses cannot be coupled")]
    CoupledMassMatrix {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
    },
    /// The stiffness matrix differs from its transpose.
    #[error("stiffness matrix is not symmetric at ({row}, {col})")]
    AsymmetricStiffness {
        /// Row of the entry.
        row: usize,
        /// Column of the entry.
        col: usize,
    },
    /// A spring constant is negative.
    #[error("spring {index} has stiffness {stiffness}, spring constants must be non-negative")]
    NegativeSpring {
        /// Position of the spring in the chain.
        index: usize,
        /// The offending spring constant.
        stiffness: f64,
    },
    /// An input contains NaN or an infinity.
    #[error("{what} contains a non-finite value")]
    NonFiniteEntry {
        /// The input with the bad value.
        what: &'static str,
    },
    /// A mode has a significantly negative squared frequency and would grow exponentially
    /// instead of oscillating.
    #[error("mode {mode} has eigenvalue {eigenvalue}, the system is unstable")]
    UnstableSystem {
        /// The mode index, in ascending eigenvalue order.
        mode: usize,
        /// The negative squared angular frequency.
        eigenvalue: f64,
    },
    /// A vector operation failed.
    #[error(transparent)]
    Vector(#[from] VectorError),
}
