//! Reconstructs the motion of a system from its normal modes.
//!
//! Every mode `i` evolves independently as
//! `q_i(t) = a_i·cos(ω_i·t) + b_i·sin(ω_i·t)/ω_i`, where `a_i` and `b_i` are the projections of
//! the initial displacement and velocity onto the mode shape, and the displacement is
//! `x(t) = Σ_i q_i(t)·v_i`. A zero-frequency mode drifts as `a_i + b_i·t`.
//!
//! Mode shapes are mass-normalized, so the projection is the mass-weighted dot product
//! `a_i = v_iᵀ·M·x₀`, which reconstructs `x₀` exactly at `t = 0`. Within a cluster of
//! (nearly) equal eigenvalues the individual mode shapes are not unique and small changes to the
//! input can rotate them; the amplitudes of such modes are sensitive, their sum is not.

use common::{interfaces::TrajectoryInterface, ops::dot_product};
use nalgebra::DVector;

use crate::{decomposer::ModalDecomposition, error::ModalError};

/// The projections of the initial state onto each mode shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalAmplitudes {
    /// `a_i`, the projection of the initial displacement.
    displacement: Vec<f64>,
    /// `b_i`, the projection of the initial velocity.
    velocity: Vec<f64>,
}

impl ModalAmplitudes {
    /// The projection of the initial displacement onto each mode.
    pub fn displacement(&self) -> &[f64] {
        &self.displacement
    }

    /// The projection of the initial velocity onto each mode. All zero for a system released
    /// from rest.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }
}

/// The trajectory of a system released from a given initial state.
///
/// The evaluator holds no clock: [`TrajectoryEvaluator::position_at`] is a pure function of its
/// argument, so times may be queried in any order, repeated, or negative.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryEvaluator<'a> {
    /// The modes of the system.
    decomposition: &'a ModalDecomposition,
    /// The modal amplitudes of the initial state.
    amplitudes: ModalAmplitudes,
    /// `ω_i = √max(λ_i, 0)`.
    angular_frequencies: Vec<f64>,
}

impl<'a> TrajectoryEvaluator<'a> {
    /// Creates the trajectory of the system released from rest at displacement `initial`.
    ///
    /// # Errors
    /// - [`ModalError::DimensionMismatch`] if `initial` does not have one entry per mode.
    /// - [`ModalError::NonFiniteEntry`] if `initial` contains NaN or an infinity.
    pub fn new(decomposition: &'a ModalDecomposition, initial: &[f64]) -> Result<Self, ModalError> {
        let velocity = project(decomposition, None, "initial velocity")?;

        Self::from_projections(decomposition, initial, velocity)
    }

    /// Creates the trajectory of the system starting at displacement `initial` with velocity
    /// `velocity`.
    ///
    /// # Errors
    /// As [`TrajectoryEvaluator::new`], for either argument.
    pub fn with_velocity(
        decomposition: &'a ModalDecomposition,
        initial: &[f64],
        velocity: &[f64],
    ) -> Result<Self, ModalError> {
        let velocity = project(decomposition, Some(velocity), "initial velocity")?;

        Self::from_projections(decomposition, initial, velocity)
    }

    /// Projects the initial displacement and assembles the evaluator.
    fn from_projections(
        decomposition: &'a ModalDecomposition,
        initial: &[f64],
        velocity: Vec<f64>,
    ) -> Result<Self, ModalError> {
        let displacement = project(decomposition, Some(initial), "initial displacement")?;
        let angular_frequencies = decomposition.angular_frequencies();

        log::debug!(
            "trajectory over {} modes, amplitudes {displacement:?}, velocity amplitudes {velocity:?}",
            decomposition.len()
        );

        Ok(Self {
            decomposition,
            amplitudes: ModalAmplitudes {
                displacement,
                velocity,
            },
            angular_frequencies,
        })
    }

    /// The modes this trajectory is built from.
    pub fn decomposition(&self) -> &'a ModalDecomposition {
        self.decomposition
    }

    /// The modal amplitudes of the initial state.
    pub fn amplitudes(&self) -> &ModalAmplitudes {
        &self.amplitudes
    }

    /// The angular frequency of each mode.
    pub fn angular_frequencies(&self) -> &[f64] {
        &self.angular_frequencies
    }

    /// The modal coordinates `q_i(t)`.
    pub fn modal_coordinates_at(&self, time: f64) -> Vec<f64> {
        self.modes()
            .map(|(a, b, omega)| {
                let (sin, cos) = (omega * time).sin_cos();
                let drift = if omega > 0.0 { sin / omega } else { time };
                a * cos + b * drift
            })
            .collect()
    }

    /// The modal velocities `q̇_i(t)`.
    pub fn modal_velocities_at(&self, time: f64) -> Vec<f64> {
        self.modes()
            .map(|(a, b, omega)| {
                let (sin, cos) = (omega * time).sin_cos();
                b * cos - a * omega * sin
            })
            .collect()
    }

    /// The displacement of every mass from equilibrium at `time`, `x(t) = Σ_i q_i(t)·v_i`.
    pub fn position_at(&self, time: f64) -> Vec<f64> {
        self.superpose(&self.modal_coordinates_at(time))
    }

    /// The velocity of every mass at `time`.
    pub fn velocity_at(&self, time: f64) -> Vec<f64> {
        self.superpose(&self.modal_velocities_at(time))
    }

    /// The total mechanical energy `½·ẋᵀ·M·ẋ + ½·xᵀ·K·x` at `time`. Constant along an undamped
    /// trajectory.
    pub fn energy(&self, time: f64) -> f64 {
        let position = DVector::from_vec(self.position_at(time));
        let velocity = DVector::from_vec(self.velocity_at(time));

        let kinetic = self.decomposition.mass().apply(&velocity).dot(&velocity);
        let potential = (self.decomposition.stiffness().as_matrix() * &position).dot(&position);

        0.5 * (kinetic + potential)
    }

    /// Iterates over `(a_i, b_i, ω_i)` for every mode.
    fn modes(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.amplitudes
            .displacement
            .iter()
            .zip(&self.amplitudes.velocity)
            .zip(&self.angular_frequencies)
            .map(|((&a, &b), &omega)| (a, b, omega))
    }

    /// Computes `Σ_i coefficients_i·v_i`.
    fn superpose(&self, coefficients: &[f64]) -> Vec<f64> {
        let n = self.decomposition.len();
        let sum = self
            .decomposition
            .mode_shapes()
            .iter()
            .zip(coefficients)
            .fold(DVector::zeros(n), |acc, (shape, &coefficient)| {
                acc + shape * coefficient
            });

        sum.iter().copied().collect()
    }
}

impl TrajectoryInterface<f64> for TrajectoryEvaluator<'_> {
    fn degrees_of_freedom(&self) -> usize {
        self.decomposition.len()
    }

    fn position_at(&self, time: f64) -> Vec<f64> {
        TrajectoryEvaluator::position_at(self, time)
    }
}

/// Computes `v_iᵀ·M·state` for every mode. A missing state projects to zero.
fn project(
    decomposition: &ModalDecomposition,
    state: Option<&[f64]>,
    what: &'static str,
) -> Result<Vec<f64>, ModalError> {
    let n = decomposition.len();
    let Some(state) = state else {
        return Ok(vec![0.0; n]);
    };

    if state.len() != n {
        return Err(ModalError::DimensionMismatch {
            what,
            expected: n,
            found: state.len(),
        });
    }
    if state.iter().any(|value| !value.is_finite()) {
        return Err(ModalError::NonFiniteEntry { what });
    }

    let weighted = decomposition
        .mass()
        .apply(&DVector::from_column_slice(state));

    decomposition
        .mode_shapes()
        .iter()
        .map(|shape| {
            dot_product(weighted.as_slice(), shape.as_slice()).map_err(ModalError::from)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use float_cmp::approx_eq;
    use nalgebra::dmatrix;
    use test_case::test_case;

    use super::*;
    use crate::{
        decomposer::ModalDecomposer,
        system::{MechanicalSystem, SpringChain},
    };

    /// Asserts that two displacement vectors agree component-wise.
    fn assert_close(actual: &[f64], expected: &[f64], epsilon: f64) {
        assert_eq!(actual.len(), expected.len(), "length of {actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                approx_eq!(f64, *a, *e, epsilon = epsilon),
                "{actual:?} != {expected:?}"
            );
        }
    }

    /// The reference chain `|~1~[0.5]~2~[1.5]~3~|`.
    fn reference_chain() -> SpringChain {
        SpringChain::build()
            .masses([0.5, 1.5])
            .springs([1.0, 2.0, 3.0])
            .finalize()
            .unwrap()
    }

    /// Decomposes `system` with the default tolerance.
    fn decompose(system: &impl MechanicalSystem) -> ModalDecomposition {
        ModalDecomposer::new().decompose_system(system).unwrap()
    }

    #[test]
    fn reference_scenario_reconstructs_initial_displacement() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();

        assert_close(&trajectory.position_at(0.0), &[0.1, 0.2], 1e-12);
    }

    #[test]
    fn reference_scenario_closed_form() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();

        // x(t) = 0.175·(1, 1)·cos(√2·t) - 0.025·(3, -1)·cos(√(22/3)·t)
        let (slow, fast) = (2.0f64.sqrt(), (22.0f64 / 3.0).sqrt());
        for time in [0.3, 1.7, 12.5, -4.0] {
            let (c1, c2) = ((slow * time).cos(), (fast * time).cos());
            let expected = [0.175 * c1 - 0.075 * c2, 0.175 * c1 + 0.025 * c2];
            assert_close(&trajectory.position_at(time), &expected, 1e-12);
        }
    }

    #[test]
    fn reference_scenario_quarter_period_moves_toward_equilibrium() {
        let decomposition = decompose(&reference_chain());
        let initial = [0.1, 0.2];
        let trajectory = TrajectoryEvaluator::new(&decomposition, &initial).unwrap();

        let quarter = decomposition.period(0).unwrap() / 4.0;
        let position = trajectory.position_at(quarter);

        for (x, x0) in position.iter().zip(initial) {
            assert!(x.abs() < x0.abs(), "{position:?} did not move toward equilibrium");
        }

        // The slow mode has died out, leaving -0.025·cos(ω₂t)·(3, -1). Mass 1 keeps its sign
        // while mass 2 has just crossed equilibrium.
        let fast = -0.025 * ((22.0f64 / 3.0).sqrt() * quarter).cos();
        assert_close(&position, &[3.0 * fast, -fast], 1e-12);
        assert!(position[0] > 0.0, "{position:?}");
        assert!(
            approx_eq!(f64, position[1], -0.0248, epsilon = 1e-4),
            "{position:?}"
        );
    }

    #[test]
    fn single_mode_is_periodic() {
        let chain = SpringChain::build()
            .masses([2.0])
            .springs([8.0, 0.0])
            .finalize()
            .unwrap();
        let decomposition = decompose(&chain);
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.3]).unwrap();

        let omega = decomposition.angular_frequency(0).unwrap();
        assert!(approx_eq!(f64, omega, 2.0, epsilon = 1e-12));

        let period = TAU / omega;
        for time in [0.0, 0.4, 1.1, 5.0] {
            assert_close(
                &trajectory.position_at(time),
                &trajectory.position_at(time + period),
                1e-12,
            );
        }
        assert_close(&trajectory.position_at(period / 2.0), &[-0.3], 1e-12);
    }

    #[test]
    fn position_is_independent_of_query_order() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();

        let first = trajectory.position_at(2.5);
        let _ = trajectory.position_at(100.0);
        let _ = trajectory.position_at(-3.0);
        assert_eq!(trajectory.position_at(2.5), first);

        // Even in time, since the system starts from rest.
        assert_close(&trajectory.position_at(-2.5), &first, 1e-12);
    }

    #[test]
    fn relabelling_masses_permutes_trajectory() {
        let forward = SpringChain::build()
            .masses([0.5, 1.5])
            .springs([1.0, 2.0, 3.0])
            .finalize()
            .unwrap();
        let reversed = SpringChain::build()
            .masses([1.5, 0.5])
            .springs([3.0, 2.0, 1.0])
            .finalize()
            .unwrap();

        let forward_modes = decompose(&forward);
        let reversed_modes = decompose(&reversed);
        let forward = TrajectoryEvaluator::new(&forward_modes, &[0.1, 0.2]).unwrap();
        let reversed = TrajectoryEvaluator::new(&reversed_modes, &[0.2, 0.1]).unwrap();

        assert_close(forward_modes.eigenvalues(), reversed_modes.eigenvalues(), 1e-12);
        for time in [0.0, 0.7, 3.3, 9.0] {
            let mut swapped = reversed.position_at(time);
            swapped.reverse();
            assert_close(&forward.position_at(time), &swapped, 1e-12);
        }
    }

    #[test]
    fn energy_is_conserved() {
        let chain = SpringChain::build()
            .masses([1.0, 3.0, 2.0])
            .springs([5.0, 1.0, 2.0, 0.5])
            .finalize()
            .unwrap();
        let decomposition = decompose(&chain);
        let trajectory =
            TrajectoryEvaluator::with_velocity(&decomposition, &[0.1, -0.2, 0.05], &[0.0, 0.3, 1.0])
                .unwrap();

        // ½·vᵀMv + ½·xᵀKx at t = 0.
        let kinetic = 0.5 * (3.0 * 0.09 + 2.0 * 1.0);
        let k = chain.stiffness_matrix().unwrap();
        let x = DVector::from_column_slice(&[0.1, -0.2, 0.05]);
        let potential = 0.5 * (k.as_matrix() * &x).dot(&x);
        let expected = kinetic + potential;

        for time in [0.0, 0.5, 2.0, 17.0] {
            let energy = trajectory.energy(time);
            assert!(
                approx_eq!(f64, energy, expected, epsilon = 1e-12),
                "energy {energy} at {time}, expected {expected}"
            );
        }
    }

    #[test]
    fn initial_velocity_is_reproduced() {
        let decomposition = decompose(&reference_chain());
        let trajectory =
            TrajectoryEvaluator::with_velocity(&decomposition, &[0.1, 0.2], &[-1.0, 0.5]).unwrap();

        assert_close(&trajectory.position_at(0.0), &[0.1, 0.2], 1e-12);
        assert_close(&trajectory.velocity_at(0.0), &[-1.0, 0.5], 1e-12);
    }

    #[test]
    fn released_from_rest_has_no_velocity_amplitude() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();

        assert_eq!(trajectory.amplitudes().velocity(), &[0.0, 0.0]);
        assert_close(&trajectory.velocity_at(0.0), &[0.0, 0.0], 1e-12);

        // a_1 = vᵀMx₀ = 0.35/√2, a_2 = -0.15/√6
        assert_close(
            trajectory.amplitudes().displacement(),
            &[0.35 / 2.0f64.sqrt(), -0.15 / 6.0f64.sqrt()],
            1e-12,
        );
    }

    #[test]
    fn rigid_body_mode_drifts() {
        let chain = SpringChain::build()
            .masses([1.0, 1.0])
            .springs([0.0, 1.0, 0.0])
            .finalize()
            .unwrap();
        let decomposition = decompose(&chain);
        let trajectory =
            TrajectoryEvaluator::with_velocity(&decomposition, &[0.0, 0.0], &[1.0, 1.0]).unwrap();

        assert_close(&trajectory.position_at(3.0), &[3.0, 3.0], 1e-9);
        assert_close(&trajectory.velocity_at(3.0), &[1.0, 1.0], 1e-9);
    }

    #[test]
    fn modal_coordinates_oscillate_independently() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();
        let amplitudes = trajectory.amplitudes().displacement().to_vec();

        // A quarter period of the slow mode zeroes its coordinate only.
        let quarter = FRAC_PI_2 / trajectory.angular_frequencies()[0];
        let coordinates = trajectory.modal_coordinates_at(quarter);
        assert!(approx_eq!(f64, coordinates[0], 0.0, epsilon = 1e-12));

        // Half a period of the fast mode inverts it.
        let half = PI / trajectory.angular_frequencies()[1];
        let coordinates = trajectory.modal_coordinates_at(half);
        assert!(approx_eq!(f64, coordinates[1], -amplitudes[1], epsilon = 1e-12));
    }

    #[test_case(&[0.1], 1 ; "too short")]
    #[test_case(&[0.1, 0.2, 0.3], 3 ; "too long")]
    fn initial_displacement_length_must_match(initial: &[f64], found: usize) {
        let decomposition = decompose(&reference_chain());

        assert_eq!(
            TrajectoryEvaluator::new(&decomposition, initial),
            Err(ModalError::DimensionMismatch {
                what: "initial displacement",
                expected: 2,
                found
            })
        );
    }

    #[test]
    fn initial_velocity_length_must_match() {
        let decomposition = decompose(&reference_chain());

        assert_eq!(
            TrajectoryEvaluator::with_velocity(&decomposition, &[0.1, 0.2], &[1.0]),
            Err(ModalError::DimensionMismatch {
                what: "initial velocity",
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn non_finite_initial_state_is_rejected() {
        let decomposition = decompose(&reference_chain());

        assert_eq!(
            TrajectoryEvaluator::new(&decomposition, &[0.1, f64::INFINITY]),
            Err(ModalError::NonFiniteEntry {
                what: "initial displacement"
            })
        );
    }

    #[test]
    fn trajectory_interface_matches_inherent_method() {
        let decomposition = ModalDecomposer::new()
            .decompose_matrices(&dmatrix![0.5, 0.0; 0.0, 1.5], &dmatrix![3.0, -2.0; -2.0, 5.0])
            .unwrap();
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();
        let interface: &dyn TrajectoryInterface<f64> = &trajectory;

        assert_eq!(interface.degrees_of_freedom(), 2);
        assert_eq!(interface.position_at(1.25), trajectory.position_at(1.25));
    }

    #[test]
    fn trajectory_is_shareable_across_threads() {
        let decomposition = decompose(&reference_chain());
        let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2]).unwrap();
        let expected: Vec<_> = (0..8).map(|i| trajectory.position_at(f64::from(i))).collect();

        let actual: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let trajectory = &trajectory;
                    scope.spawn(move || trajectory.position_at(f64::from(i)))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(actual, expected);
    }
}
