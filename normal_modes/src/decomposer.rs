//! Solves the generalized eigenvalue problem `K·v = ω²·M·v`.
//!
//! The eigenpairs are those of the dynamical matrix `A = M⁻¹·K`. Because `M` is diagonal and
//! positive, `A` is similar to the symmetric matrix `S = M^(-1/2)·K·M^(-1/2)`:
//! if `S·ψ = λ·ψ` then `A·(M^(-1/2)·ψ) = λ·(M^(-1/2)·ψ)`. Solving the symmetric problem gives
//! real eigenvalues and an orthonormal `ψ` basis even when `A` itself is not symmetric, and the
//! mode shapes `v = M^(-1/2)·ψ` come out mass-normalized (`vᵀ·M·v = 1`).

use std::f64::consts::TAU;

use itertools::Itertools;
use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::{
    error::ModalError,
    system::{MassMatrix, MechanicalSystem, StiffnessMatrix},
};

/// Eigenvalues down to `-DEFAULT_EIGENVALUE_TOLERANCE` times the largest eigenvalue magnitude
/// are treated as round-off and clamped to zero.
pub const DEFAULT_EIGENVALUE_TOLERANCE: f64 = 1e-9;

/// Computes the normal modes of a system of coupled oscillators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalDecomposer {
    /// The relative tolerance for negative eigenvalues.
    tolerance: f64,
}

impl Default for ModalDecomposer {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_EIGENVALUE_TOLERANCE,
        }
    }
}

impl ModalDecomposer {
    /// Creates a [`ModalDecomposer`] with the [`DEFAULT_EIGENVALUE_TOLERANCE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`ModalDecomposer`] that clamps eigenvalues in
    /// `[-tolerance·max|λ|, 0)` to zero. Negative or non-finite tolerances are treated as zero.
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance: if tolerance.is_finite() {
                tolerance.max(0.0)
            } else {
                0.0
            },
        }
    }

    /// The relative tolerance for negative eigenvalues.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Decomposes a system into its normal modes, sorted by ascending eigenvalue.
    ///
    /// # Errors
    /// - [`ModalError::DimensionMismatch`] if `mass` and `stiffness` differ in order.
    /// - [`ModalError::NonFiniteEntry`] if `M^(-1/2)·K·M^(-1/2)` overflows.
    /// - [`ModalError::UnstableSystem`] if an eigenvalue is negative beyond the tolerance.
    pub fn decompose(
        &self,
        mass: MassMatrix,
        stiffness: StiffnessMatrix,
    ) -> Result<ModalDecomposition, ModalError> {
        let n = mass.dimension();
        if stiffness.dimension() != n {
            return Err(ModalError::DimensionMismatch {
                what: "stiffness matrix",
                expected: n,
                found: stiffness.dimension(),
            });
        }

        let inv_sqrt = mass.inverse_sqrt();
        let k = stiffness.as_matrix();
        let symmetric = DMatrix::from_fn(n, n, |row, col| {
            inv_sqrt[row] * k[(row, col)] * inv_sqrt[col]
        });

        // Finite inputs can still overflow once scaled by the masses.
        if symmetric.iter().any(|entry| !entry.is_finite()) {
            return Err(ModalError::NonFiniteEntry {
                what: "dynamical matrix",
            });
        }

        let eigen = SymmetricEigen::new(symmetric);
        let scale = eigen
            .eigenvalues
            .iter()
            .fold(0.0_f64, |acc, eigenvalue| acc.max(eigenvalue.abs()));
        let threshold = self.tolerance * if scale > 0.0 { scale } else { 1.0 };

        let sorted = (0..n)
            .map(|mode| {
                let shape =
                    DVector::from_fn(n, |row, _| eigen.eigenvectors[(row, mode)] * inv_sqrt[row]);
                (eigen.eigenvalues[mode], shape)
            })
            .sorted_by(|a, b| a.0.total_cmp(&b.0));

        let mut eigenvalues = Vec::with_capacity(n);
        let mut mode_shapes = Vec::with_capacity(n);
        for (mode, (eigenvalue, shape)) in sorted.enumerate() {
            eigenvalues.push(clamp_eigenvalue(mode, eigenvalue, threshold)?);
            mode_shapes.push(orient(shape));
        }

        log::debug!("decomposed {n}-degree-of-freedom system, eigenvalues {eigenvalues:?}");

        Ok(ModalDecomposition {
            eigenvalues,
            mode_shapes,
            mass,
            stiffness,
        })
    }

    /// Validates a mass and stiffness matrix and decomposes them. The mass matrix is checked
    /// first, so a singular mass matrix is reported before anything about the stiffness. The
    /// orders are compared next, before the stiffness entries are looked at.
    ///
    /// # Errors
    /// As [`MassMatrix::from_matrix`], [`StiffnessMatrix::new`] and
    /// [`ModalDecomposer::decompose`].
    pub fn decompose_matrices(
        &self,
        mass: &DMatrix<f64>,
        stiffness: &DMatrix<f64>,
    ) -> Result<ModalDecomposition, ModalError> {
        let mass = MassMatrix::from_matrix(mass)?;
        let n = mass.dimension();
        if let Some(found) = [stiffness.nrows(), stiffness.ncols()]
            .into_iter()
            .find(|&order| order != n)
        {
            return Err(ModalError::DimensionMismatch {
                what: "stiffness matrix",
                expected: n,
                found,
            });
        }
        let stiffness = StiffnessMatrix::new(stiffness.clone())?;

        self.decompose(mass, stiffness)
    }

    /// Builds the matrices of `system` and decomposes them.
    ///
    /// # Errors
    /// As [`MechanicalSystem::mass_matrix`], [`MechanicalSystem::stiffness_matrix`] and
    /// [`ModalDecomposer::decompose`].
    pub fn decompose_system<S: MechanicalSystem + ?Sized>(
        &self,
        system: &S,
    ) -> Result<ModalDecomposition, ModalError> {
        self.decompose(system.mass_matrix()?, system.stiffness_matrix()?)
    }
}

/// Clamps round-off negatives to zero and rejects anything more negative than `-threshold`, or
/// anything that is not a number at all.
fn clamp_eigenvalue(mode: usize, eigenvalue: f64, threshold: f64) -> Result<f64, ModalError> {
    if !eigenvalue.is_finite() {
        Err(ModalError::NonFiniteEntry {
            what: "dynamical matrix",
        })
    } else if eigenvalue >= 0.0 {
        Ok(eigenvalue)
    } else if eigenvalue >= -threshold {
        log::debug!("clamping eigenvalue {eigenvalue:e} of mode {mode} to zero");
        Ok(0.0)
    } else {
        log::warn!("mode {mode} has eigenvalue {eigenvalue}, system is unstable");
        Err(ModalError::UnstableSystem { mode, eigenvalue })
    }
}

/// Flips `shape` so that its largest-magnitude component is positive.
fn orient(shape: DVector<f64>) -> DVector<f64> {
    let pivot = shape
        .iter()
        .copied()
        .max_by(|a, b| a.abs().total_cmp(&b.abs()))
        .unwrap_or(0.0);

    if pivot < 0.0 {
        -shape
    } else {
        shape
    }
}

/// The natural frequencies and mode shapes of a system.
///
/// Mode `i` has eigenvalue `eigenvalues()[i]` and mode shape `mode_shape(i)`; modes are sorted by
/// ascending eigenvalue. Every mode shape is mass-normalized and oriented so that its largest
/// component is positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalDecomposition {
    /// The squared angular frequencies, `ω²`, ascending and non-negative.
    eigenvalues: Vec<f64>,
    /// The mode shapes, index aligned with `eigenvalues`.
    mode_shapes: Vec<DVector<f64>>,
    /// The mass matrix that was decomposed.
    mass: MassMatrix,
    /// The stiffness matrix that was decomposed.
    stiffness: StiffnessMatrix,
}

impl ModalDecomposition {
    /// The number of modes, equal to the number of degrees of freedom.
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Always `false`: a decomposition has at least one mode.
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// The squared angular frequencies, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// The squared angular frequency of `mode`.
    pub fn eigenvalue(&self, mode: usize) -> Option<f64> {
        self.eigenvalues.get(mode).copied()
    }

    /// The angular frequency `ω = √λ` of `mode`, in radians per unit time.
    pub fn angular_frequency(&self, mode: usize) -> Option<f64> {
        self.eigenvalue(mode).map(|eigenvalue| eigenvalue.max(0.0).sqrt())
    }

    /// The angular frequencies of every mode.
    pub fn angular_frequencies(&self) -> Vec<f64> {
        (0..self.len())
            .filter_map(|mode| self.angular_frequency(mode))
            .collect()
    }

    /// The frequency `ω / 2π` of `mode`, in cycles per unit time.
    pub fn frequency_hz(&self, mode: usize) -> Option<f64> {
        self.angular_frequency(mode).map(|omega| omega / TAU)
    }

    /// The period `2π / ω` of `mode`. `None` for a zero-frequency (rigid body) mode.
    pub fn period(&self, mode: usize) -> Option<f64> {
        self.angular_frequency(mode)
            .filter(|&omega| omega > 0.0)
            .map(|omega| TAU / omega)
    }

    /// The mode shape of `mode`.
    pub fn mode_shape(&self, mode: usize) -> Option<&DVector<f64>> {
        self.mode_shapes.get(mode)
    }

    /// All mode shapes, index aligned with [`ModalDecomposition::eigenvalues`].
    pub fn mode_shapes(&self) -> &[DVector<f64>] {
        &self.mode_shapes
    }

    /// The modal matrix, with one mode shape per column.
    pub fn modal_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_columns(&self.mode_shapes)
    }

    /// The mass matrix of the decomposed system.
    pub fn mass(&self) -> &MassMatrix {
        &self.mass
    }

    /// The stiffness matrix of the decomposed system.
    pub fn stiffness(&self) -> &StiffnessMatrix {
        &self.stiffness
    }

    /// The dynamical matrix `A = M⁻¹·K` whose eigenpairs these are.
    pub fn dynamical_matrix(&self) -> DMatrix<f64> {
        let mut dynamical = self.stiffness.as_matrix().clone();
        for (mut row, mass) in dynamical.row_iter_mut().zip(self.mass.diagonal().iter()) {
            row /= *mass;
        }

        dynamical
    }

    /// How far `mode` is from satisfying `K·v = λ·M·v`, as
    /// `‖K·v − λ·M·v‖ / (‖K‖·‖v‖ + |λ|·‖M·v‖)`.
    pub fn pairing_residual(&self, mode: usize) -> Option<f64> {
        let eigenvalue = self.eigenvalue(mode)?;
        let shape = self.mode_shape(mode)?;

        let lhs = self.stiffness.as_matrix() * shape;
        let rhs = self.mass.apply(shape) * eigenvalue;
        let scale = self.stiffness.as_matrix().norm() * shape.norm() + rhs.norm();

        Some(if scale > 0.0 {
            (lhs - rhs).norm() / scale
        } else {
            0.0
        })
    }
}
