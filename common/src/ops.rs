use crate::{error::VectorError, vector::Vector, Float};

/// Checks that two operands have the same length.
fn check_dimensions<T>(u: &[T], v: &[T]) -> Result<(), VectorError> {
    if u.len() == v.len() {
        Ok(())
    } else {
        Err(VectorError::DimensionMismatch {
            left: u.len(),
            right: v.len(),
        })
    }
}

/// Calculates the dot product of two vectors of the form `[u1, u2, ..., un]`.
///
/// # Errors
/// Returns [`VectorError::DimensionMismatch`] if `u` and `v` differ in length.
pub fn dot_product<T: Float>(u: &[T], v: &[T]) -> Result<T, VectorError> {
    check_dimensions(u, v)?;

    Ok(sum_of_products(u, v))
}

/// `Σ u_i·v_i` over the shorter of the two operands. Callers check the lengths.
pub(crate) fn sum_of_products<T: Float>(u: &[T], v: &[T]) -> T {
    u.iter()
        .zip(v)
        .fold(T::zero(), |acc, (&a, &b)| acc + a * b)
}

/// The Euclidean magnitude of `u`.
///
/// # Errors
/// Returns [`VectorError::ZeroVector`] if it is zero.
pub(crate) fn nonzero_magnitude<T: Float>(u: &[T]) -> Result<T, VectorError> {
    let magnitude = magnitude_squared(u).sqrt();
    if magnitude == T::zero() {
        return Err(VectorError::ZeroVector);
    }

    Ok(magnitude)
}

/// Calculates the cross product `u × v` of two 3-vectors.
///
/// # Errors
/// Returns [`VectorError::DimensionMismatch`] if `u` and `v` differ in length, and
/// [`VectorError::UnsupportedDimension`] if they are not 3-vectors.
pub fn cross_product<T: Float>(u: &[T], v: &[T]) -> Result<[T; 3], VectorError> {
    check_dimensions(u, v)?;
    let u = Vector::<T, 3>::try_from(u)?;
    let v = Vector::<T, 3>::try_from(v)?;

    Ok(u.cross(v).into_inner())
}

/// Calculates `u · u`.
pub fn magnitude_squared<T: Float>(u: &[T]) -> T {
    sum_of_products(u, u)
}

/// Scales `u` to unit length.
///
/// # Errors
/// Returns [`VectorError::ZeroVector`] if `u` has zero magnitude (this includes the empty vector).
pub fn normalize<T: Float>(u: &[T]) -> Result<Vec<T>, VectorError> {
    let magnitude = nonzero_magnitude(u)?;

    Ok(u.iter().map(|&a| a / magnitude).collect())
}
