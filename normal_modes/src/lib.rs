#![forbid(
    missing_docs,
    clippy::missing_assert_message,
    clippy::missing_docs_in_private_items,
    clippy::missing_panics_doc
)]
//! Computes the motion of masses coupled by springs through normal-mode decomposition.
//!
//! A [`MechanicalSystem`] such as a [`SpringChain`] supplies a [`MassMatrix`] and a
//! [`StiffnessMatrix`]; the [`ModalDecomposer`] factors them once into a
//! [`ModalDecomposition`], and a [`TrajectoryEvaluator`] built from the decomposition and an
//! initial displacement answers [`position_at`](TrajectoryEvaluator::position_at) for any time.
//!
//! ```
//! use normal_modes::{ModalDecomposer, SpringChain, TrajectoryEvaluator};
//!
//! let chain = SpringChain::build()
//!     .masses([0.5, 1.5])
//!     .springs([1.0, 2.0, 3.0])
//!     .finalize()?;
//! let decomposition = ModalDecomposer::new().decompose_system(&chain)?;
//! let trajectory = TrajectoryEvaluator::new(&decomposition, &[0.1, 0.2])?;
//!
//! let x = trajectory.position_at(0.0);
//! assert!((x[0] - 0.1).abs() < 1e-12 && (x[1] - 0.2).abs() < 1e-12);
//! # Ok::<(), normal_modes::ModalError>(())
//! ```

/// Defines the [`ModalDecomposer`](crate::decomposer::ModalDecomposer) and the
/// [`ModalDecomposition`](crate::decomposer::ModalDecomposition) it produces.
pub mod decomposer;

/// Defines the [`ModalError`](crate::error::ModalError) type.
pub mod error;

/// Contains the mass and stiffness matrices, the
/// [`MechanicalSystem`](crate::system::MechanicalSystem) trait, and the
/// [`SpringChain`](crate::system::SpringChain) implementation of it.
pub mod system;

/// Defines the [`TrajectoryEvaluator`](crate::trajectory::TrajectoryEvaluator), which maps time
/// to displacement.
pub mod trajectory;

pub use decomposer::{ModalDecomposer, ModalDecomposition};
pub use error::ModalError;
pub use system::{MassMatrix, MechanicalSystem, SpringChain, StiffnessMatrix};
pub use trajectory::{ModalAmplitudes, TrajectoryEvaluator};
