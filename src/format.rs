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

//! Payload formatting for the write operations of [`LogWriter`](crate::LogWriter).
//!
//! Formatting always happens before the writer's lock is taken, so these types are usable on
//! their own to preview what a write would append.

pub use join::Join;
pub use json::encode_json;
pub use printf::Printf;
pub use printf::write_printf;

mod join;
mod json;
mod printf;
