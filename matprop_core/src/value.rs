//! # Scalar-or-Array Values
//!
//! Every physical quantity in matprop_core is either a single number or a
//! one-dimensional array of numbers (one entry per evaluated state). `Value`
//! is that union, with element-wise arithmetic and scalar broadcasting.
//!
//! ## Broadcasting
//!
//! - scalar ⊕ scalar → scalar
//! - scalar ⊕ array  → array (the scalar is repeated)
//! - array ⊕ array   → array, lengths must match (a length-1 array broadcasts)
//!
//! The operator impls panic on two incompatible array lengths, the same
//! contract ndarray uses for shape mismatches. Use [`Value::try_zip_with`]
//! where lengths come from user input.
//!
//! ## Example
//!
//! ```rust
//! use matprop_core::value::Value;
//!
//! let t = Value::from(vec![300.0, 400.0]);
//! let rho = 8084.2 - t.clone() * 0.42086;
//! assert_eq!(rho.len(), 2);
//! assert_eq!((Value::from(2.0) * 3.0).as_scalar(), Some(6.0));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::{MatError, MatResult};

/// A scalar or a one-dimensional array of f64
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Array(Vec<f64>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Scalar(0.0)
    }
}

impl Value {
    /// Number of entries (1 for a scalar)
    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Array(v) => v.len(),
        }
    }

    /// True for an empty array
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Array(v) if v.is_empty())
    }

    /// True if this value is array-valued (even with a single entry)
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// The scalar, if this is a scalar or a length-1 array
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            Value::Array(v) if v.len() == 1 => Some(v[0]),
            Value::Array(_) => None,
        }
    }

    /// Entry `i`, broadcasting scalars
    pub fn get(&self, i: usize) -> Option<f64> {
        match self {
            Value::Scalar(x) => Some(*x),
            Value::Array(v) if v.len() == 1 => v.first().copied(),
            Value::Array(v) => v.get(i).copied(),
        }
    }

    /// All entries as a vector
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Value::Scalar(x) => vec![*x],
            Value::Array(v) => v.clone(),
        }
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let slice: &[f64] = match self {
            Value::Scalar(x) => std::slice::from_ref(x),
            Value::Array(v) => v.as_slice(),
        };
        slice.iter().copied()
    }

    /// Repeat a scalar (or length-1 array) up to `n` entries
    pub fn broadcast_to(&self, n: usize) -> MatResult<Value> {
        match self {
            Value::Scalar(x) => Ok(Value::Array(vec![*x; n])),
            Value::Array(v) if v.len() == 1 => Ok(Value::Array(vec![v[0]; n])),
            Value::Array(v) if v.len() == n => Ok(self.clone()),
            Value::Array(v) => Err(MatError::invalid_input(
                "value",
                format!("array of length {}", v.len()),
                format!("cannot broadcast to length {}", n),
            )),
        }
    }

    /// Squeeze a length-1 array to a scalar
    pub fn squeeze(self) -> Value {
        match self {
            Value::Array(v) if v.len() == 1 => Value::Scalar(v[0]),
            other => other,
        }
    }

    /// Apply `f` to every entry
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(x) => Value::Scalar(f(*x)),
            Value::Array(v) => Value::Array(v.iter().map(|x| f(*x)).collect()),
        }
    }

    /// Combine two values element-wise with broadcasting
    pub fn try_zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> MatResult<Value> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b))),
            (Value::Scalar(a), Value::Array(b)) => {
                Ok(Value::Array(b.iter().map(|x| f(*a, *x)).collect()))
            }
            (Value::Array(a), Value::Scalar(b)) => {
                Ok(Value::Array(a.iter().map(|x| f(*x, *b)).collect()))
            }
            (Value::Array(a), Value::Array(b)) => {
                if a.len() == b.len() {
                    Ok(Value::Array(a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()))
                } else if a.len() == 1 {
                    Ok(Value::Array(b.iter().map(|y| f(a[0], *y)).collect()))
                } else if b.len() == 1 {
                    Ok(Value::Array(a.iter().map(|x| f(*x, b[0])).collect()))
                } else {
                    Err(MatError::invalid_input(
                        "value",
                        format!("arrays of length {} and {}", a.len(), b.len()),
                        "All values must be of equal size or a singular value",
                    ))
                }
            }
        }
    }

    // Operators panic on mismatched lengths; try_zip_with is the checked form
    fn zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
        match self.try_zip_with(other, f) {
            Ok(v) => v,
            Err(e) => panic!("{}", e),
        }
    }

    /// Integer power
    pub fn powi(&self, n: i32) -> Value {
        self.map(|x| x.powi(n))
    }

    /// Float power
    pub fn powf(&self, n: f64) -> Value {
        self.map(|x| x.powf(n))
    }

    /// Square root
    pub fn sqrt(&self) -> Value {
        self.map(f64::sqrt)
    }

    /// Absolute value
    pub fn abs(&self) -> Value {
        self.map(f64::abs)
    }

    /// True if any entry satisfies `pred`
    pub fn any(&self, pred: impl Fn(f64) -> bool) -> bool {
        self.iter().any(pred)
    }

    /// Element-wise closeness (`|a - b| <= 1e-8 + 1e-5 * |b|`)
    pub fn allclose(&self, other: &Value) -> bool {
        match self.try_zip_with(other, |a, b| {
            if (a - b).abs() <= 1e-8 + 1e-5 * b.abs() {
                1.0
            } else {
                0.0
            }
        }) {
            Ok(v) => v.iter().all(|x| x == 1.0),
            Err(_) => false,
        }
    }

    /// Element-wise closeness with a relative tolerance only
    pub fn approx_eq(&self, other: &Value, rel_tol: f64) -> bool {
        match self.try_zip_with(other, |a, b| {
            let scale = a.abs().max(b.abs());
            if (a - b).abs() <= rel_tol * scale {
                1.0
            } else {
                0.0
            }
        }) {
            Ok(v) => v.iter().all(|x| x == 1.0),
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Scalar(x) => write!(f, "{}", x),
            Value::Array(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Scalar(x)
    }
}

impl From<i32> for Value {
    fn from(x: i32) -> Self {
        Value::Scalar(x as f64)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(v)
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Array(v.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(v: [f64; N]) -> Self {
        Value::Array(v.to_vec())
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_value_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<Value> for Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                self.zip_with(&rhs, |a, b| a $op b)
            }
        }

        impl $trait<&Value> for &Value {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                self.zip_with(rhs, |a, b| a $op b)
            }
        }

        impl $trait<f64> for Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<f64> for &Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                self.map(|a| a $op rhs)
            }
        }

        impl $trait<Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                rhs.map(|b| self $op b)
            }
        }

        impl $trait<&Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: &Value) -> Value {
                rhs.map(|b| self $op b)
            }
        }
    };
}

impl_value_op!(Add, add, +);
impl_value_op!(Sub, sub, -);
impl_value_op!(Mul, mul, *);
impl_value_op!(Div, div, /);

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        self.map(|x| -x)
    }
}

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Value {
        self.map(|x| -x)
    }
}
