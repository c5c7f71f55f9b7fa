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

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::ErrorKind;

const MESSAGE_KEY: &str = "message";

/// Encodes `fields` plus a `"message"` key as a single-line JSON object.
///
/// `fields` must serialize to a JSON object, or to `null` for "no fields" (`&()` or `&None`).
/// The `"message"` key always holds `message`, replacing a caller-supplied value under the same
/// key. No trailing newline is added.
///
/// # Errors
///
/// Returns an [`ErrorKind::Serialization`] error if `fields` fails to serialize or serializes to
/// anything other than an object or `null`.
///
/// # Examples
///
/// ```
/// use logwriter::format::encode_json;
/// use serde_json::json;
///
/// let line = encode_json("user logged in", &json!({"user_id": 7})).unwrap();
/// assert_eq!(line, r#"{"message":"user logged in","user_id":7}"#);
///
/// let line = encode_json("started", &()).unwrap();
/// assert_eq!(line, r#"{"message":"started"}"#);
/// ```
pub fn encode_json<T>(message: &str, fields: &T) -> Result<String, Error>
where
    T: Serialize + ?Sized,
{
    let mut object = match serde_json::to_value(fields).map_err(Error::from_serde_error)? {
        Value::Object(object) => object,
        Value::Null => Map::new(),
        other => {
            return Err(
                Error::new(ErrorKind::Serialization, "json fields must be an object")
                    .with_context("found", json_type(&other)),
            );
        }
    };

    object.insert(MESSAGE_KEY.to_string(), Value::String(message.to_string()));
    serde_json::to_string(&object).map_err(Error::from_serde_error)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
