//! Tolerant scalar comparison for time stepping
//!
//! Floating point values compare with a relative tolerance so that
//! accumulated time steps land on their targets; integers compare exactly.

/// Scalar types that [`ValueCompare`] can order
pub trait Comparable: Copy + PartialOrd {
    /// Relative tolerance used for this type, zero for exact types
    const DEFAULT_EPSILON: Self;

    /// True when `a` and `b` are equal within `eps` relative to their magnitude
    fn nearly_equal(a: Self, b: Self, eps: Self) -> bool;
}

macro_rules! impl_comparable_float {
    ($($t:ty),*) => {
        $(
            impl Comparable for $t {
                const DEFAULT_EPSILON: Self = 1e-14;

                fn nearly_equal(a: Self, b: Self, eps: Self) -> bool {
                    if a == b {
                        return true;
                    }
                    let scale = a.abs().max(b.abs());
                    (a - b).abs() <= eps * scale
                }
            }
        )*
    };
}

macro_rules! impl_comparable_int {
    ($($t:ty),*) => {
        $(
            impl Comparable for $t {
                const DEFAULT_EPSILON: Self = 0;

                fn nearly_equal(a: Self, b: Self, _eps: Self) -> bool {
                    a == b
                }
            }
        )*
    };
}

impl_comparable_float!(f32, f64);
impl_comparable_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Comparison with a relative tolerance
#[derive(Debug, Clone, Copy)]
pub struct ValueCompare<T: Comparable> {
    eps: T,
}

impl<T: Comparable> Default for ValueCompare<T> {
    fn default() -> Self {
        Self {
            eps: T::DEFAULT_EPSILON,
        }
    }
}

impl<T: Comparable> ValueCompare<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comparison with a custom relative tolerance
    pub fn with_epsilon(eps: T) -> Self {
        Self { eps }
    }

    pub fn epsilon(&self) -> T {
        self.eps
    }

    /// `a == b` within tolerance
    pub fn equal(&self, a: T, b: T) -> bool {
        T::nearly_equal(a, b, self.eps)
    }

    /// `a < b` and not within tolerance of `b`
    pub fn less_than(&self, a: T, b: T) -> bool {
        a < b && !self.equal(a, b)
    }

    /// `a > b` and not within tolerance of `b`
    pub fn greater_than(&self, a: T, b: T) -> bool {
        a > b && !self.equal(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_tolerance() {
        let cmp = ValueCompare::<f64>::new();

        // 0.1 * 3 accumulates rounding error
        let t = 0.1 + 0.1 + 0.1;
        assert!(t != 0.3);
        assert!(cmp.equal(t, 0.3));
        assert!(!cmp.less_than(0.3, t));
        assert!(!cmp.greater_than(t, 0.3));

        assert!(cmp.less_than(0.29, 0.3));
        assert!(cmp.greater_than(0.31, 0.3));
        assert!(cmp.equal(0.0, 0.0));
        assert!(!cmp.equal(0.0, 1e-300));
    }

    #[test]
    fn test_integer_exact() {
        let cmp = ValueCompare::<usize>::new();
        assert!(cmp.equal(3, 3));
        assert!(cmp.less_than(2, 3));
        assert!(!cmp.less_than(3, 3));
        assert!(cmp.greater_than(4, 3));

        let cmp = ValueCompare::<i32>::new();
        assert!(cmp.less_than(-1, 0));
    }

    #[test]
    fn test_custom_epsilon() {
        let cmp = ValueCompare::with_epsilon(1e-3);
        assert!(cmp.equal(1.0, 1.0005));
        assert!(!cmp.less_than(1.0, 1.0005));
        assert_eq!(cmp.epsilon(), 1e-3);
    }
}
