//! N-dimensional numeric arrays carried as leaves of a [`Value`](crate::Value) tree.
//!
//! Every dtype maps to one Rust element type through [`Element`], and
//! [`NumericArray`] holds one `ndarray::ArrayD` per dtype. Element order on the
//! wire is always logical row-major (last axis fastest), whatever the memory
//! layout of the underlying array.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array, ArrayD, Dimension, IxDyn, ShapeError};
use serde_json::{Number, Value as JsonValue};

const NAN_TAG: &str = "NaN";
const POS_INF_TAG: &str = "Infinity";
const NEG_INF_TAG: &str = "-Infinity";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl DType {
    pub const ALL: [DType; 10] = [
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::Uint8,
        DType::Uint16,
        DType::Uint32,
        DType::Uint64,
        DType::Float32,
        DType::Float64,
    ];

    /// Wire tag, e.g. `"float64"`.
    pub fn name(self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Uint8 => "uint8",
            DType::Uint16 => "uint16",
            DType::Uint32 => "uint32",
            DType::Uint64 => "uint64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| format!("unrecognized dtype tag {s:?}"))
    }
}

/// A scalar type that can live in a [`NumericArray`].
pub trait Element: Copy + PartialEq + fmt::Debug + 'static {
    const DTYPE: DType;

    /// JSON form of one element. Never fails: non-finite floats become tag strings.
    fn to_json(self) -> JsonValue;

    /// Inverse of [`Element::to_json`]; `None` if `value` does not fit this type.
    fn from_json(value: &JsonValue) -> Option<Self>;

    fn into_array(array: ArrayD<Self>) -> NumericArray;
}

macro_rules! int_element {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl Element for $t {
            const DTYPE: DType = DType::$variant;

            fn to_json(self) -> JsonValue {
                JsonValue::from(self)
            }

            fn from_json(value: &JsonValue) -> Option<Self> {
                if let Some(n) = value.as_i64() {
                    return <$t>::try_from(n).ok();
                }
                value.as_u64().and_then(|n| <$t>::try_from(n).ok())
            }

            fn into_array(array: ArrayD<Self>) -> NumericArray {
                NumericArray::$variant(array)
            }
        }
    )*};
}

int_element!(
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
);

fn float_to_json(x: f64) -> JsonValue {
    match Number::from_f64(x) {
        Some(n) => JsonValue::Number(n),
        None if x.is_nan() => JsonValue::from(NAN_TAG),
        None if x > 0.0 => JsonValue::from(POS_INF_TAG),
        None => JsonValue::from(NEG_INF_TAG),
    }
}

fn float_from_json(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => match s.as_str() {
            NAN_TAG => Some(f64::NAN),
            POS_INF_TAG => Some(f64::INFINITY),
            NEG_INF_TAG => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::Float64;

    fn to_json(self) -> JsonValue {
        float_to_json(self)
    }

    fn from_json(value: &JsonValue) -> Option<Self> {
        float_from_json(value)
    }

    fn into_array(array: ArrayD<Self>) -> NumericArray {
        NumericArray::Float64(array)
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::Float32;

    // f32 -> f64 is exact, so the narrowing cast in from_json restores the bits.
    fn to_json(self) -> JsonValue {
        float_to_json(f64::from(self))
    }

    // A finite value that overflows f32 is not representable and is rejected.
    fn from_json(value: &JsonValue) -> Option<Self> {
        let x = float_from_json(value)?;
        let y = x as f32;
        (y.is_finite() || !x.is_finite()).then_some(y)
    }

    fn into_array(array: ArrayD<Self>) -> NumericArray {
        NumericArray::Float32(array)
    }
}

/// An n-dimensional numeric array with a fixed shape and dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    Int8(ArrayD<i8>),
    Int16(ArrayD<i16>),
    Int32(ArrayD<i32>),
    Int64(ArrayD<i64>),
    Uint8(ArrayD<u8>),
    Uint16(ArrayD<u16>),
    Uint32(ArrayD<u32>),
    Uint64(ArrayD<u64>),
    Float32(ArrayD<f32>),
    Float64(ArrayD<f64>),
}

macro_rules! with_array {
    ($value:expr, $a:ident => $body:expr) => {
        match $value {
            NumericArray::Int8($a) => $body,
            NumericArray::Int16($a) => $body,
            NumericArray::Int32($a) => $body,
            NumericArray::Int64($a) => $body,
            NumericArray::Uint8($a) => $body,
            NumericArray::Uint16($a) => $body,
            NumericArray::Uint32($a) => $body,
            NumericArray::Uint64($a) => $body,
            NumericArray::Float32($a) => $body,
            NumericArray::Float64($a) => $body,
        }
    };
}

fn dtype_of<T: Element>(_: &ArrayD<T>) -> DType {
    T::DTYPE
}

fn collect_elements<T: Element>(data: &[JsonValue]) -> Result<Vec<T>, String> {
    data.iter()
        .enumerate()
        .map(|(i, v)| {
            T::from_json(v).ok_or_else(|| format!("element {i} is not a valid {}: {v}", T::DTYPE))
        })
        .collect()
}

fn build<T: Element>(shape: &[usize], data: &[JsonValue]) -> Result<NumericArray, String> {
    let elems = collect_elements::<T>(data)?;
    ArrayD::from_shape_vec(IxDyn(shape), elems)
        .map(T::into_array)
        .map_err(|e| e.to_string())
}

impl NumericArray {
    /// Build an array from row-major `data`.
    pub fn from_shape_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self, ShapeError> {
        ArrayD::from_shape_vec(IxDyn(shape), data).map(T::into_array)
    }

    /// Rebuild an array of `dtype` from its flattened JSON elements.
    ///
    /// The caller has already checked that `data.len()` matches `shape`.
    pub(crate) fn from_json_elements(
        dtype: DType,
        shape: &[usize],
        data: &[JsonValue],
    ) -> Result<Self, String> {
        match dtype {
            DType::Int8 => build::<i8>(shape, data),
            DType::Int16 => build::<i16>(shape, data),
            DType::Int32 => build::<i32>(shape, data),
            DType::Int64 => build::<i64>(shape, data),
            DType::Uint8 => build::<u8>(shape, data),
            DType::Uint16 => build::<u16>(shape, data),
            DType::Uint32 => build::<u32>(shape, data),
            DType::Uint64 => build::<u64>(shape, data),
            DType::Float32 => build::<f32>(shape, data),
            DType::Float64 => build::<f64>(shape, data),
        }
    }

    pub fn dtype(&self) -> DType {
        with_array!(self, a => dtype_of(a))
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements (1 for a rank-0 array).
    pub fn len(&self) -> usize {
        with_array!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements as JSON values in row-major order.
    pub fn to_json_elements(&self) -> Vec<JsonValue> {
        with_array!(self, a => a.iter().map(|&x| x.to_json()).collect())
    }
}

macro_rules! accessors {
    ($($name:ident => $variant:ident: $t:ty),* $(,)?) => {
        impl NumericArray {
            $(
                pub fn $name(&self) -> Option<&ArrayD<$t>> {
                    match self {
                        NumericArray::$variant(a) => Some(a),
                        _ => None,
                    }
                }
            )*
        }
    };
}

accessors!(
    as_i8 => Int8: i8,
    as_i16 => Int16: i16,
    as_i32 => Int32: i32,
    as_i64 => Int64: i64,
    as_u8 => Uint8: u8,
    as_u16 => Uint16: u16,
    as_u32 => Uint32: u32,
    as_u64 => Uint64: u64,
    as_f32 => Float32: f32,
    as_f64 => Float64: f64,
);

impl<T: Element, D: Dimension> From<Array<T, D>> for NumericArray {
    fn from(array: Array<T, D>) -> Self {
        T::into_array(array.into_dyn())
    }
}
