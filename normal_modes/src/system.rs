use nalgebra::{DMatrix, DVector};

use crate::error::ModalError;

/// Relative tolerance for `K[i][j] == K[j][i]`.
pub const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// A description of a mechanical system of coupled, undamped degrees of freedom.
pub trait MechanicalSystem {
    /// The number of degrees of freedom, i.e. the order of the mass and stiffness matrices.
    fn degrees_of_freedom(&self) -> usize;

    /// Builds the mass matrix of the system.
    ///
    /// # Errors
    /// Returns an error if the system parameters do not describe a valid mass matrix.
    fn mass_matrix(&self) -> Result<MassMatrix, ModalError>;

    /// Builds the stiffness matrix of the system.
    ///
    /// # Errors
    /// Returns an error if the system parameters do not describe a valid stiffness matrix.
    fn stiffness_matrix(&self) -> Result<StiffnessMatrix, ModalError>;
}

/// A diagonal matrix of strictly positive masses, one per degree of freedom.
///
/// Only the diagonal is stored, so the "no coupling through mass" invariant holds by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MassMatrix {
    /// The masses along the diagonal.
    diagonal: DVector<f64>,
}

impl MassMatrix {
    /// Creates a [`MassMatrix`] from the masses of each degree of freedom.
    ///
    /// # Errors
    /// - [`ModalError::EmptySystem`] if `masses` is empty.
    /// - [`ModalError::NonFiniteEntry`] if a mass is NaN or infinite.
    /// - [`ModalError::SingularMassMatrix`] if a mass is zero or negative.
    pub fn from_diagonal(masses: &[f64]) -> Result<Self, ModalError> {
        if masses.is_empty() {
            return Err(ModalError::EmptySystem);
        }

        for (index, &mass) in masses.iter().enumerate() {
            if !mass.is_finite() {
                return Err(ModalError::NonFiniteEntry {
                    what: "mass matrix",
                });
            }
            if mass <= 0.0 {
                return Err(ModalError::SingularMassMatrix { index, mass });
            }
        }

        Ok(Self {
            diagonal: DVector::from_column_slice(masses),
        })
    }

    /// Creates a [`MassMatrix`] from a full square matrix, which must be diagonal.
    ///
    /// # Errors
    /// - [`ModalError::DimensionMismatch`] if `matrix` is not square.
    /// - [`ModalError::CoupledMassMatrix`] if an off-diagonal entry is non-zero.
    /// - Anything [`MassMatrix::from_diagonal`] returns for the diagonal.
    pub fn from_matrix(matrix: &DMatrix<f64>) -> Result<Self, ModalError> {
        check_square(matrix, "mass matrix")?;

        let diagonal: Vec<f64> = matrix.diagonal().iter().copied().collect();
        let masses = Self::from_diagonal(&diagonal)?;

        for col in 0..matrix.ncols() {
            for row in (0..matrix.nrows()).filter(|&row| row != col) {
                if matrix[(row, col)] != 0.0 {
                    return Err(ModalError::CoupledMassMatrix { row, col });
                }
            }
        }

        Ok(masses)
    }

    /// The number of degrees of freedom.
    pub fn dimension(&self) -> usize {
        self.diagonal.len()
    }

    /// The masses along the diagonal.
    pub fn diagonal(&self) -> &DVector<f64> {
        &self.diagonal
    }

    /// The full `N×N` matrix.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_diagonal(&self.diagonal)
    }

    /// The diagonal of `M^(-1/2)`.
    pub(crate) fn inverse_sqrt(&self) -> DVector<f64> {
        self.diagonal.map(|mass| mass.sqrt().recip())
    }

    /// Computes `M·x`.
    pub(crate) fn apply(&self, x: &DVector<f64>) -> DVector<f64> {
        self.diagonal.component_mul(x)
    }
}

/// A symmetric matrix of spring couplings.
#[derive(Debug, Clone, PartialEq)]
pub struct StiffnessMatrix {
    /// The full matrix.
    matrix: DMatrix<f64>,
}

impl StiffnessMatrix {
    /// Creates a [`StiffnessMatrix`].
    ///
    /// # Errors
    /// - [`ModalError::DimensionMismatch`] if `matrix` is not square.
    /// - [`ModalError::EmptySystem`] if `matrix` is `0×0`.
    /// - [`ModalError::NonFiniteEntry`] if an entry is NaN or infinite.
    /// - [`ModalError::AsymmetricStiffness`] if `matrix` is not symmetric within
    ///   [`SYMMETRY_TOLERANCE`].
    pub fn new(matrix: DMatrix<f64>) -> Result<Self, ModalError> {
        check_square(&matrix, "stiffness matrix")?;
        if matrix.is_empty() {
            return Err(ModalError::EmptySystem);
        }
        if matrix.iter().any(|entry| !entry.is_finite()) {
            return Err(ModalError::NonFiniteEntry {
                what: "stiffness matrix",
            });
        }

        let n = matrix.nrows();
        for row in 0..n {
            for col in (row + 1)..n {
                let (upper, lower) = (matrix[(row, col)], matrix[(col, row)]);
                let scale = upper.abs().max(lower.abs()).max(1.0);
                if (upper - lower).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(ModalError::AsymmetricStiffness { row, col });
                }
            }
        }

        Ok(Self { matrix })
    }

    /// Creates a `dimension×dimension` [`StiffnessMatrix`] from its entries in row-major order.
    ///
    /// # Errors
    /// [`ModalError::DimensionMismatch`] if `entries` does not hold `dimension²` values, otherwise
    /// as [`StiffnessMatrix::new`].
    pub fn from_row_slice(dimension: usize, entries: &[f64]) -> Result<Self, ModalError> {
        if entries.len() != dimension * dimension {
            return Err(ModalError::DimensionMismatch {
                what: "stiffness matrix entries",
                expected: dimension * dimension,
                found: entries.len(),
            });
        }

        Self::new(DMatrix::from_row_slice(dimension, dimension, entries))
    }

    /// The number of degrees of freedom.
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// The full matrix.
    pub fn as_matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

/// Checks that `matrix` is square.
fn check_square(matrix: &DMatrix<f64>, what: &'static str) -> Result<(), ModalError> {
    if matrix.nrows() == matrix.ncols() {
        Ok(())
    } else {
        Err(ModalError::DimensionMismatch {
            what,
            expected: matrix.nrows(),
            found: matrix.ncols(),
        })
    }
}

/// A line of masses joined by springs, with the outermost springs anchored to walls:
///
/// ```text
/// |~~k1~~[m1]~~k2~~[m2]~~ ... ~~[mN]~~k(N+1)~~|
/// ```
///
/// A spring constant of zero leaves that end free.
#[derive(Debug, Clone, PartialEq)]
pub struct SpringChain {
    /// The masses, from the left wall to the right wall.
    masses: Vec<f64>,
    /// The spring constants, from the left wall to the right wall. There is one more spring than
    /// there are masses.
    springs: Vec<f64>,
}

impl SpringChain {
    /// Starts building a [`SpringChain`].
    pub fn build() -> SpringChainBuilder {
        SpringChainBuilder {
            masses: None,
            springs: None,
        }
    }

    /// The masses, from left to right.
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// The spring constants, from left to right.
    pub fn springs(&self) -> &[f64] {
        &self.springs
    }
}

impl MechanicalSystem for SpringChain {
    fn degrees_of_freedom(&self) -> usize {
        self.masses.len()
    }

    fn mass_matrix(&self) -> Result<MassMatrix, ModalError> {
        MassMatrix::from_diagonal(&self.masses)
    }

    fn stiffness_matrix(&self) -> Result<StiffnessMatrix, ModalError> {
        let n = self.masses.len();
        let k = &self.springs;

        // Mass i sits between springs i and i + 1.
        let matrix = DMatrix::from_fn(n, n, |row, col| {
            if row == col {
                k[row] + k[row + 1]
            } else if row + 1 == col {
                -k[col]
            } else if col + 1 == row {
                -k[row]
            } else {
                0.0
            }
        });

        StiffnessMatrix::new(matrix)
    }
}

/// The builder for a [`SpringChain`].
#[derive(Debug, Clone, Default)]
pub struct SpringChainBuilder {
    /// The masses, if set.
    masses: Option<Vec<f64>>,
    /// The spring constants, if set.
    springs: Option<Vec<f64>>,
}

impl SpringChainBuilder {
    /// Sets the masses, from left to right.
    pub fn masses(mut self, masses: impl Into<Vec<f64>>) -> Self {
        self.masses.replace(masses.into());

        self
    }

    /// Sets the spring constants, from left to right.
    pub fn springs(mut self, springs: impl Into<Vec<f64>>) -> Self {
        self.springs.replace(springs.into());

        self
    }

    /// Validates the chain.
    ///
    /// # Errors
    /// - [`ModalError::EmptySystem`] if no masses were given.
    /// - [`ModalError::DimensionMismatch`] unless there is exactly one more spring than masses.
    /// - [`ModalError::NonFiniteEntry`] if a mass or spring is NaN or infinite.
    /// - [`ModalError::SingularMassMatrix`] if a mass is not strictly positive.
    /// - [`ModalError::NegativeSpring`] if a spring constant is negative.
    pub fn finalize(self) -> Result<SpringChain, ModalError> {
        let masses = self.masses.unwrap_or_default();
        let springs = self.springs.unwrap_or_default();

        // Reuse the mass matrix checks so the chain cannot hold a mass the matrix would reject.
        MassMatrix::from_diagonal(&masses)?;

        if springs.len() != masses.len() + 1 {
            return Err(ModalError::DimensionMismatch {
                what: "spring chain springs",
                expected: masses.len() + 1,
                found: springs.len(),
            });
        }
        for (index, &stiffness) in springs.iter().enumerate() {
            if !stiffness.is_finite() {
                return Err(ModalError::NonFiniteEntry {
                    what: "spring chain springs",
                });
            }
            if stiffness < 0.0 {
                return Err(ModalError::NegativeSpring { index, stiffness });
            }
        }

        Ok(SpringChain { masses, springs })
    }
}
