use bytemuck::{Pod, Zeroable};

use std::{ops::Index, str::FromStr};

use crate::{
    error::VectorError,
    ops,
    parse::{parse_vector, ParseVectorError},
    Float,
};

/// A fixed-size vector. Operations between vectors of different dimension do not compile, so
/// unlike the slice operations in [`ops`](crate::ops) there is no dimension check at runtime.
///
/// ```compile_fail
/// use common::vector::Vector;
/// let x = Vector::new([1.0f64, 2.0]);
/// let y = Vector::new([1.0f64, 2.0, 3.0]);
/// let _ = x.dot(y);
/// ```
#[derive(Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub struct Vector<T, const DIMS: usize>([T; DIMS]);

impl<T, const DIMS: usize> Clone for Vector<T, DIMS>
where
    [T; DIMS]: Clone,
{
    fn clone(&self) -> Self {
        Vector(self.0.clone())
    }
}
impl<T, const DIMS: usize> Copy for Vector<T, DIMS> where [T; DIMS]: Copy {}

impl<T: num::Zero, const DIMS: usize> Vector<T, DIMS> {
    /// The vector with every component set to zero.
    #[inline]
    pub fn zero() -> Self {
        Vector::from_idx(|_| T::zero())
    }
}

impl<T: num::Zero + num::One, const DIMS: usize> Vector<T, DIMS> {
    /// The unit vector along axis `idx`.
    pub fn basis(idx: usize) -> Self {
        Vector::from_idx(|i| if i == idx { T::one() } else { T::zero() })
    }
}

impl<T, const DIMS: usize> Vector<T, DIMS> {
    /// Wraps an array as a [`Vector`].
    pub fn new(data: [T; DIMS]) -> Vector<T, DIMS> {
        Self(data)
    }

    /// Borrows the components as a slice.
    pub fn as_array(&self) -> &[T] {
        &self.0
    }

    /// Unwraps the [`Vector`] into its array.
    pub fn into_inner(self) -> [T; DIMS] {
        self.0
    }

    /// Applies `map_fn` to every component.
    #[inline]
    pub fn map<U>(self, map_fn: impl Fn(T) -> U) -> Vector<U, DIMS> {
        Vector(self.0.map(map_fn))
    }

    /// Builds a vector from a function of the component index.
    #[inline]
    pub fn from_idx(idx_fn: impl Fn(usize) -> T) -> Self {
        Self(std::array::from_fn(idx_fn))
    }
}

impl<T: Float, const DIMS: usize> Vector<T, DIMS> {
    /// The dot product of `self` and `rhs`.
    #[inline]
    pub fn dot(self, rhs: Self) -> T {
        ops::sum_of_products(self.as_array(), rhs.as_array())
    }

    /// The squared Euclidean magnitude, `self · self`.
    #[inline]
    pub fn magnitude_squared(self) -> T {
        ops::magnitude_squared(self.as_array())
    }

    /// The unit vector pointing along `self`.
    ///
    /// # Errors
    /// Returns [`VectorError::ZeroVector`] if every component is zero.
    pub fn normalize(self) -> Result<Self, VectorError> {
        let magnitude = ops::nonzero_magnitude(self.as_array())?;

        Ok(self.map(|i| i / magnitude))
    }
}

impl<T> Vector<T, 3>
where
    T: Copy + std::ops::Mul<Output = T> + std::ops::Sub<Output = T>,
{
    /// The cross product `self × rhs`.
    pub fn cross(self, rhs: Self) -> Self {
        let [a1, a2, a3] = self.0;
        let [b1, b2, b3] = rhs.0;

        Vector([a2 * b3 - a3 * b2, a3 * b1 - a1 * b3, a1 * b2 - a2 * b1])
    }
}

impl<T, const DIMS: usize> Index<usize> for Vector<T, DIMS> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}


impl<T: Float, const DIMS: usize> TryFrom<&[T]> for Vector<T, DIMS> {
    type Error = VectorError;

    fn try_from(value: &[T]) -> Result<Self, Self::Error> {
        <[T; DIMS]>::try_from(value)
            .map(Self)
            .map_err(|_| VectorError::UnsupportedDimension {
                expected: DIMS,
                found: value.len(),
            })
    }
}

impl<T: Float + FromStr, const DIMS: usize> FromStr for Vector<T, DIMS> {
    type Err = ParseVectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_vector::<T>(s)?;
        let found = values.len();

        Self::try_from(values.as_slice()).map_err(|_| ParseVectorError::WrongLength {
            expected: DIMS,
            found,
        })
    }
}

macro_rules! impl_unary_operation {
    ($op:ident) => {
        paste::paste! {
            impl<T: Copy, U, const DIMS: usize> std::ops::$op for Vector<T, DIMS>
            where
                T: std::ops::$op<Output = U>,
            {
                type Output = Vector<U, DIMS>;

                fn [< $op:lower >](self) -> Self::Output {
                    Vector::from_idx(|i| self[i].[< $op:lower >]())
                }
            }
        }
    };
}

macro_rules! impl_binary_operation {
    ($($op:ident),+$(,)?) => {
        paste::paste! {
            $(impl<T: Copy, U: Copy, V, const DIMS: usize> std::ops::$op<Vector<U, DIMS>> for Vector<T, DIMS>
            where
                T: std::ops::$op<U, Output = V>,
            {
                type Output = Vector<V, DIMS>;

                fn [< $op:lower >](self, rhs: Vector<U, DIMS>) -> Self::Output {
                    Vector::from_idx(|i| self[i].[< $op:lower >](rhs[i]))
                }
            })+
        }

        paste::paste! {
            $(impl<T: Copy, U: Copy + num::Num, V, const DIMS: usize> std::ops::$op<U> for Vector<T, DIMS>
            where
                T: std::ops::$op<U, Output = V>,
            {
                type Output = Vector<V, DIMS>;

                fn [< $op:lower >](self, rhs: U) -> Self::Output {
                    Vector::from_idx(|i| self[i].[< $op:lower >](rhs))
                }
            })+
        }
    };
}

impl_unary_operation!(Neg);
impl_binary_operation!(Add, Sub, Mul, Div);
