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

/// Appends values joined by the print-style separator rule.
///
/// Each operand is converted with [`Value::from`](crate::Value). Expands to
/// [`LogWriter::write_values`](crate::LogWriter::write_values).
///
/// # Examples
///
/// ```no_run
/// let writer = logwriter::LogWriter::open("app.log")?;
/// logwriter::write_values!(writer, "took", 42, "ms")?;
/// # Ok::<(), logwriter::Error>(())
/// ```
#[macro_export]
macro_rules! write_values {
    ($writer:expr $(, $value:expr)* $(,)?) => {
        $writer.write_values(&[$($crate::Value::from($value)),*])
    };
}

/// Appends values joined by the print-style separator rule, followed by a newline.
///
/// Expands to [`LogWriter::write_line`](crate::LogWriter::write_line).
///
/// # Examples
///
/// ```no_run
/// let writer = logwriter::LogWriter::open("app.log")?;
/// logwriter::write_line!(writer, "Hello, log!")?;
/// # Ok::<(), logwriter::Error>(())
/// ```
#[macro_export]
macro_rules! write_line {
    ($writer:expr $(, $value:expr)* $(,)?) => {
        $writer.write_line(&[$($crate::Value::from($value)),*])
    };
}

/// Appends a printf-style template with its arguments substituted.
///
/// Expands to [`LogWriter::write_formatted`](crate::LogWriter::write_formatted).
///
/// # Examples
///
/// ```no_run
/// let writer = logwriter::LogWriter::open("app.log")?;
/// logwriter::write_formatted!(writer, "Hello, %s %d!\n", "world", 2024)?;
/// # Ok::<(), logwriter::Error>(())
/// ```
#[macro_export]
macro_rules! write_formatted {
    ($writer:expr, $format:expr $(, $arg:expr)* $(,)?) => {
        $writer.write_formatted($format, &[$($crate::Value::from($arg)),*])
    };
}
