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

use std::fmt;
use std::fmt::Write;

use crate::Value;

/// Joins values with the print-style separator rule.
///
/// Values are rendered in order with their default representation. A single space separates
/// two adjacent values unless both are [`Value::Str`]. No leading or trailing separator is
/// emitted.
///
/// # Examples
///
/// ```
/// use logwriter::Value;
/// use logwriter::format::Join;
///
/// let values = [Value::from("took"), Value::from(42), Value::from("ms")];
/// assert_eq!(Join::new(&values).to_string(), "took 42 ms");
///
/// let values = [Value::from("key="), Value::from("value")];
/// assert_eq!(Join::new(&values).to_string(), "key=value");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Join<'a, 'v> {
    values: &'a [Value<'v>],
}

impl<'a, 'v> Join<'a, 'v> {
    /// Creates a new [`Join`] over `values`.
    pub fn new(values: &'a [Value<'v>]) -> Self {
        Self { values }
    }
}

impl fmt::Display for Join<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<&Value> = None;
        for value in self.values {
            if let Some(prev) = prev {
                if !(prev.is_str() && value.is_str()) {
                    f.write_char(' ')?;
                }
            }
            write!(f, "{value}")?;
            prev = Some(value);
        }
        Ok(())
    }
}
