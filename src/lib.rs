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

//! Logwriter is a minimal, concurrent-safe, append-only text log writer.
//!
//! # Overview
//!
//! A [`LogWriter`] owns one file opened in append mode and a lock around it. Any number of
//! threads may write through a shared reference: every write operation formats its payload
//! first and then appends it while holding the lock, so each payload lands in the file as one
//! contiguous run. Formatting variants cover raw text, print-style joined values, printf-style
//! templates and single-line JSON objects.
//!
//! Errors are returned to the caller as [`Error`], whose [`ErrorKind`] tells OS failures apart
//! from payloads that cannot be encoded. Logwriter never retries, logs or swallows an error.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use logwriter::LogWriter;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("app.log");
//! let writer = Arc::new(LogWriter::open(&path)?);
//!
//! let handles = (0..4)
//!     .map(|i| {
//!         let writer = writer.clone();
//!         thread::spawn(move || logwriter::write_line!(writer, "worker", i, "done"))
//!     })
//!     .collect::<Vec<_>>();
//! for handle in handles {
//!     handle.join().unwrap()?;
//! }
//!
//! writer.write_json_line("shutdown", &serde_json::json!({"workers": 4}))?;
//! writer.close()?;
//!
//! let content = std::fs::read_to_string(&path).unwrap();
//! assert_eq!(content.lines().count(), 5);
//! assert!(content.contains("worker 2 done\n"));
//! assert!(content.ends_with("{\"message\":\"shutdown\",\"workers\":4}\n"));
//! # Ok::<(), logwriter::Error>(())
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
mod macros;

mod error;
pub use error::Error;
pub use error::ErrorKind;

mod value;
pub use value::Value;

pub mod format;

mod writer;
pub use writer::LogWriter;

#[cfg(feature = "bridge-log")]
pub mod bridge;
