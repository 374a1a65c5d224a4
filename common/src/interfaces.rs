use crate::Float;

/// The interface for a trajectory of a system of coupled degrees of freedom.
///
/// Implementations must be pure in `time`: querying the same time twice gives the same answer,
/// whatever was queried in between. The run loop owns the notion of "current time".
// ANCHOR: TrajectoryInterface
pub trait TrajectoryInterface<T: Float> {
    /// The number of degrees of freedom, i.e. the length of every position returned.
    fn degrees_of_freedom(&self) -> usize;

    /// Gets the displacement of every degree of freedom from equilibrium at the given time.
    fn position_at(&self, time: T) -> Vec<T>;
}
// ANCHOR_END: TrajectoryInterface
