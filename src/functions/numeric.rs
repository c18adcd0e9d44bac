// ABOUTME: Mixed-kind arithmetic for template functions (add, subtract, multiply, divide, modulo, minimum, maximum)
// ABOUTME: Coerces dynamic values into signed, unsigned or float operands and applies explicit promotion rules

use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;

use super::error::{FunctionError, Result};

/// The numeric kinds an operand can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Signed,
    Unsigned,
    Float,
}

/// A single numeric operand, scoped to one operation call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

/// The binary operations exposed to templates.
///
/// Every operation is called as `op(b, a)` and computes `a OP b`, so that the
/// value produced by an inner expression can be passed last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Minimum,
    Maximum,
}

/// Both operands after promotion into a common domain.
#[derive(Debug, Clone, Copy)]
enum Promoted {
    Signed(i64, i64),
    Unsigned(u64, u64),
    Float(f64, f64),
}

impl NumericValue {
    pub fn kind(&self) -> NumericKind {
        match self {
            NumericValue::Signed(_) => NumericKind::Signed,
            NumericValue::Unsigned(_) => NumericKind::Unsigned,
            NumericValue::Float(_) => NumericKind::Float,
        }
    }

    /// Classify a dynamic template value.
    ///
    /// Integers that fit in `i64` are signed, larger integers are unsigned and
    /// every other number is a float. The strings `+Inf`, `-Inf` and `NaN`
    /// produced by [`NumericValue::to_json`] read back as floats. Anything else
    /// is rejected.
    pub fn from_json(op: &'static str, value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::String(s) => match s.as_str() {
                "+Inf" => Ok(NumericValue::Float(f64::INFINITY)),
                "-Inf" => Ok(NumericValue::Float(f64::NEG_INFINITY)),
                "NaN" => Ok(NumericValue::Float(f64::NAN)),
                _ => Err(unsupported(op, value)),
            },
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(NumericValue::Signed(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(NumericValue::Unsigned(u))
                } else if let Some(f) = n.as_f64() {
                    Ok(NumericValue::Float(f))
                } else {
                    Err(unsupported(op, value))
                }
            }
            other => Err(unsupported(op, other)),
        }
    }

    /// Convert back into a template value.
    ///
    /// Floats stay JSON floats, so a whole result such as `2.0` keeps its kind
    /// when passed on to another operation. JSON has no representation for
    /// infinities or NaN, so non-finite floats become the strings `+Inf`,
    /// `-Inf` and `NaN`, which [`NumericValue::from_json`] accepts again.
    pub fn to_json(self) -> JsonValue {
        match self {
            NumericValue::Signed(i) => JsonValue::from(i),
            NumericValue::Unsigned(u) => JsonValue::from(u),
            NumericValue::Float(f) if f.is_nan() => JsonValue::String("NaN".to_string()),
            NumericValue::Float(f) if f.is_infinite() => {
                let text = if f.is_sign_positive() { "+Inf" } else { "-Inf" };
                JsonValue::String(text.to_string())
            }
            NumericValue::Float(f) => JsonValue::from(f),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            NumericValue::Signed(i) => i as f64,
            NumericValue::Unsigned(u) => u as f64,
            NumericValue::Float(f) => f,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Signed(i) => write!(f, "{}", i),
            NumericValue::Unsigned(u) => write!(f, "{}", u),
            NumericValue::Float(v) if v.is_infinite() => {
                write!(f, "{}", if v.is_sign_positive() { "+Inf" } else { "-Inf" })
            }
            NumericValue::Float(v) => write!(f, "{}", v),
        }
    }
}

macro_rules! numeric_from {
    ($variant:ident, $target:ty; $($source:ty),*) => {
        $(
            impl From<$source> for NumericValue {
                fn from(value: $source) -> Self {
                    NumericValue::$variant(value as $target)
                }
            }
        )*
    };
}

numeric_from!(Signed, i64; i8, i16, i32, i64, isize);
numeric_from!(Unsigned, u64; u8, u16, u32, u64, usize);
numeric_from!(Float, f64; f32, f64);

impl BinaryOp {
    pub const ALL: [BinaryOp; 7] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
        BinaryOp::Modulo,
        BinaryOp::Minimum,
        BinaryOp::Maximum,
    ];

    /// Name the operation is registered under.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
            BinaryOp::Modulo => "modulo",
            BinaryOp::Minimum => "minimum",
            BinaryOp::Maximum => "maximum",
        }
    }

    /// Apply the operation as `a OP b`.
    pub fn apply(self, b: NumericValue, a: NumericValue) -> Result<NumericValue> {
        match self {
            BinaryOp::Add => Ok(arithmetic(
                a,
                b,
                i64::wrapping_add,
                u64::wrapping_add,
                |x, y| x + y,
            )),
            BinaryOp::Subtract => Ok(arithmetic(
                a,
                b,
                i64::wrapping_sub,
                u64::wrapping_sub,
                |x, y| x - y,
            )),
            BinaryOp::Multiply => Ok(arithmetic(
                a,
                b,
                i64::wrapping_mul,
                u64::wrapping_mul,
                |x, y| x * y,
            )),
            BinaryOp::Divide => divide_values(a, b),
            BinaryOp::Modulo => modulo_values(a, b),
            BinaryOp::Minimum => Ok(select(a, b, Ordering::Less)),
            BinaryOp::Maximum => Ok(select(a, b, Ordering::Greater)),
        }
    }

    /// Classify both dynamic operands and apply the operation as `a OP b`.
    pub fn apply_json(self, b: &JsonValue, a: &JsonValue) -> Result<NumericValue> {
        let a = NumericValue::from_json(self.name(), a)?;
        let b = NumericValue::from_json(self.name(), b)?;
        self.apply(b, a)
    }
}

fn promote(a: NumericValue, b: NumericValue) -> Promoted {
    use NumericValue::*;

    match (a, b) {
        (Float(x), y) => Promoted::Float(x, y.as_f64()),
        (x, Float(y)) => Promoted::Float(x.as_f64(), y),
        (Signed(x), Signed(y)) => Promoted::Signed(x, y),
        (Signed(x), Unsigned(y)) => Promoted::Signed(x, y as i64),
        (Unsigned(x), Signed(y)) => Promoted::Signed(x as i64, y),
        (Unsigned(x), Unsigned(y)) => Promoted::Unsigned(x, y),
    }
}

fn arithmetic(
    a: NumericValue,
    b: NumericValue,
    signed: fn(i64, i64) -> i64,
    unsigned: fn(u64, u64) -> u64,
    float: fn(f64, f64) -> f64,
) -> NumericValue {
    match promote(a, b) {
        Promoted::Signed(x, y) => NumericValue::Signed(signed(x, y)),
        Promoted::Unsigned(x, y) => NumericValue::Unsigned(unsigned(x, y)),
        Promoted::Float(x, y) => NumericValue::Float(float(x, y)),
    }
}

// Integer division by zero traps natively; it is reported as an error here
// rather than masked. Float division follows IEEE 754.
fn divide_values(a: NumericValue, b: NumericValue) -> Result<NumericValue> {
    match promote(a, b) {
        Promoted::Signed(_, 0) | Promoted::Unsigned(_, 0) => {
            Err(FunctionError::IntegerDivideByZero { op: "divide" })
        }
        Promoted::Signed(x, y) => Ok(NumericValue::Signed(x.wrapping_div(y))),
        Promoted::Unsigned(x, y) => Ok(NumericValue::Unsigned(x / y)),
        Promoted::Float(x, y) => Ok(NumericValue::Float(x / y)),
    }
}

fn modulo_values(a: NumericValue, b: NumericValue) -> Result<NumericValue> {
    match promote(a, b) {
        Promoted::Float(..) => {
            let float = if a.kind() == NumericKind::Float { a } else { b };
            Err(FunctionError::UnsupportedModuloOperand {
                found: format!("{} (float)", float),
            })
        }
        Promoted::Signed(_, 0) | Promoted::Unsigned(_, 0) => {
            Err(FunctionError::IntegerDivideByZero { op: "modulo" })
        }
        Promoted::Signed(x, y) => Ok(NumericValue::Signed(x.wrapping_rem(y))),
        Promoted::Unsigned(x, y) => Ok(NumericValue::Unsigned(x % y)),
    }
}

/// Return `a` when it compares `wanted` against `b` in the promoted domain,
/// otherwise `b`. Ties and unordered floats yield `b`.
fn select(a: NumericValue, b: NumericValue, wanted: Ordering) -> NumericValue {
    let ordering = match promote(a, b) {
        Promoted::Signed(x, y) => Some(x.cmp(&y)),
        Promoted::Unsigned(x, y) => Some(x.cmp(&y)),
        Promoted::Float(x, y) => x.partial_cmp(&y),
    };

    if ordering == Some(wanted) {
        a
    } else {
        b
    }
}

fn unsupported(op: &'static str, value: &JsonValue) -> FunctionError {
    let type_name = match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    };
    FunctionError::UnsupportedOperand {
        op,
        found: format!("{} ({})", value, type_name),
    }
}

/// Returns `a + b`.
pub fn add(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Add.apply(b.into(), a.into())
}

/// Returns `a - b`.
pub fn subtract(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Subtract.apply(b.into(), a.into())
}

/// Returns `a * b`.
pub fn multiply(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Multiply.apply(b.into(), a.into())
}

/// Returns `a / b`.
pub fn divide(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Divide.apply(b.into(), a.into())
}

/// Returns `a % b`. Integer operands only.
pub fn modulo(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Modulo.apply(b.into(), a.into())
}

/// Returns whichever of `a` and `b` is smaller, in its original representation.
pub fn minimum(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Minimum.apply(b.into(), a.into())
}

/// Returns whichever of `a` and `b` is larger, in its original representation.
pub fn maximum(b: impl Into<NumericValue>, a: impl Into<NumericValue>) -> Result<NumericValue> {
    BinaryOp::Maximum.apply(b.into(), a.into())
}

/// Parse a base-10 signed 64-bit integer. The empty string parses as 0.
pub fn parse_int(input: &str) -> Result<i64> {
    if input.is_empty() {
        return Ok(0);
    }

    input
        .parse::<i64>()
        .map_err(|source| FunctionError::ParseFailure {
            input: input.to_string(),
            source,
        })
}
