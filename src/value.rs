// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Operands accepted by the value-joining and printf-style write operations.

use std::fmt;

/// A borrowed operand of [`LogWriter::write_values`], [`LogWriter::write_line`] and
/// [`LogWriter::write_formatted`].
///
/// The default representation of a value is its [`Display`](fmt::Display) output.
///
/// [`LogWriter::write_values`]: crate::LogWriter::write_values
/// [`LogWriter::write_line`]: crate::LogWriter::write_line
/// [`LogWriter::write_formatted`]: crate::LogWriter::write_formatted
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// A string slice.
    Str(&'a str),
    /// A single character.
    Char(char),
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A floating point number.
    F64(f64),
    /// Any other displayable value.
    Display(&'a dyn fmt::Display),
}

impl<'a> Value<'a> {
    /// Wraps any [`Display`](fmt::Display) value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::Ipv4Addr;
    ///
    /// use logwriter::Value;
    ///
    /// let addr = Ipv4Addr::LOCALHOST;
    /// assert_eq!(Value::display(&addr).to_string(), "127.0.0.1");
    /// ```
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Value::Display(value)
    }

    /// Returns `true` if this value is a string slice.
    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Name of the value's type, as shown in printf diagnostics like `%!d(str=hello)`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "str",
            Value::Char(_) => "char",
            Value::Bool(_) => "bool",
            Value::I64(_) => "i64",
            Value::U64(_) => "u64",
            Value::F64(_) => "f64",
            Value::Display(_) => "display",
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.write_str(v),
            Value::Char(v) => fmt::Display::fmt(v, f),
            Value::Bool(v) => fmt::Display::fmt(v, f),
            Value::I64(v) => fmt::Display::fmt(v, f),
            Value::U64(v) => fmt::Display::fmt(v, f),
            Value::F64(v) => fmt::Display::fmt(v, f),
            Value::Display(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Value::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Display(v) => f
                .debug_tuple("Display")
                .field(&format_args!("{v}"))
                .finish(),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Str(value)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Value::Str(value.as_str())
    }
}

impl From<char> for Value<'_> {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_number {
    ($variant:ident as $target:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(value: $ty) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )+
    };
}

impl_from_number!(I64 as i64: i8, i16, i32, i64, isize);
impl_from_number!(U64 as u64: u8, u16, u32, u64, usize);
impl_from_number!(F64 as f64: f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_representation() {
        let owned = String::from("owned");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::from(&owned).to_string(), "owned");
        assert_eq!(Value::from('x').to_string(), "x");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-42i8).to_string(), "-42");
        assert_eq!(Value::from(7usize).to_string(), "7");
        assert_eq!(Value::from(2.5f32).to_string(), "2.5");
        assert_eq!(Value::from(1.0).to_string(), "1");
    }

    #[test]
    fn test_integer_conversions_pick_signedness() {
        assert!(matches!(Value::from(2024), Value::I64(2024)));
        assert!(matches!(Value::from(2024u16), Value::U64(2024)));
        assert!(matches!(Value::from(u64::MAX), Value::U64(u64::MAX)));
    }

    #[test]
    fn test_only_str_is_string_like() {
        let n = 3;
        assert!(Value::from("a").is_str());
        assert!(!Value::from('a').is_str());
        assert!(!Value::display(&n).is_str());
    }
}
