use std::fmt;

/// A runtime value. `Nil` is the language's absence-of-value marker.
///
/// The derived equality is the language's `==`: same-typed values compare
/// natively and values of different types are never equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// `nil` and `false` are falsey, everything else (`0` and `""` included) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(number) if number.is_infinite() => {
                let sign = if number.is_sign_negative() { "-" } else { "" };
                write!(f, "{sign}Infinity")
            }
            // f64's Display already drops the ".0" of integral values
            Value::Number(number) => write!(f, "{number}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}
