#![forbid(
    missing_docs,
    clippy::missing_assert_message,
    clippy::missing_docs_in_private_items,
    clippy::missing_asserts_for_indexing,
    clippy::missing_panics_doc
)]
//! This crate defines the common types, vector utilities, and interfaces shared by the normal-mode
//! solver and the playback coordinator.

/// Defines the interfaces accessible to the components of the spring-mass simulation:
/// - Trajectory: Maps a point in time to the displacement of every degree of freedom.
pub mod interfaces;

/// Defines the [`VectorError`](crate::error::VectorError) type returned by the vector
/// operations.
pub mod error;

/// Defines the length-checked vector operations on slices: dot product, cross product,
/// squared magnitude, and normalization.
pub mod ops;

/// Defines the parser for bracketed, comma separated vector literals such as `[1, 2.5, -3]`.
pub mod parse;

/// Defines a useful [`Copy`] and [`bytemuck::Pod`]-implementing
/// [`Vector<T, const DIMS: usize>`](crate::vector::Vector) that wraps the array type.
pub mod vector;

/// This trait defines the set of floats that have nice computer properties.
pub trait Float:
    num::Float + bytemuck::Pod + Send + Sync + Default + std::fmt::Debug + std::fmt::Display
{
}

impl Float for f32 {}
impl Float for f64 {}
