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

//! Bridge from the [`log`] crate facade to a [`LogWriter`].
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use logwriter::LogWriter;
//! use logwriter::bridge::LineLayout;
//! use logwriter::bridge::LogBridge;
//!
//! let writer = Arc::new(LogWriter::open("my_service.log")?);
//! LogBridge::builder(writer)
//!     .filter_from_env_or("MY_SERVICE_LOG", "debug")
//!     .layout(LineLayout::Json)
//!     .apply()
//!     .expect("a logger is already installed");
//!
//! log::info!("This log will be written to my_service.log.");
//! # Ok::<(), logwriter::Error>(())
//! ```

use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

pub use env_filter::Builder as EnvFilterBuilder;
pub use env_filter::Filter as EnvFilter;
use jiff::Zoned;
use jiff::tz::TimeZone;
use log::LevelFilter;
use log::Metadata;
use log::Record;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::LogWriter;

const DEFAULT_FILTER_ENV: &str = "RUST_LOG";
const DEFAULT_FILTER: &str = "info";

/// How a [`LogBridge`] renders each record. Every record becomes exactly one line.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LineLayout {
    /// Plain text:
    ///
    /// ```text
    /// 2024-08-11T22:44:57.172105+08:00 ERROR my_service: src/main.rs:51 Hello error! user=alice
    /// 2024-08-11T22:44:57.172219+08:00  WARN my_service: src/main.rs:52 Hello warn!
    /// ```
    #[default]
    Text,
    /// One JSON object per line:
    ///
    /// ```json
    /// {"file":"src/main.rs","kvs":{"user":"alice"},"level":"ERROR","line":51,"message":"Hello error!","target":"my_service","timestamp":"2024-08-11T22:44:57.172051+08:00[Asia/Shanghai]"}
    /// ```
    Json,
}

/// A builder to configure and create a [`LogBridge`].
#[derive(Debug)]
pub struct LogBridgeBuilder {
    writer: Arc<LogWriter>,
    filter: Option<EnvFilter>,
    layout: LineLayout,
    tz: Option<TimeZone>,
}

impl LogBridgeBuilder {
    /// Creates a new builder appending to `writer`.
    pub fn new(writer: Arc<LogWriter>) -> Self {
        Self {
            writer,
            filter: None,
            layout: LineLayout::default(),
            tz: None,
        }
    }

    /// Sets the filter for records.
    ///
    /// Default to the directives in the `RUST_LOG` environment variable, or `info` if it is not
    /// set.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use logwriter::LogWriter;
    /// use logwriter::bridge::EnvFilterBuilder;
    /// use logwriter::bridge::LogBridge;
    ///
    /// let writer = Arc::new(LogWriter::open("my_service.log")?);
    /// let filter = EnvFilterBuilder::new().parse("warn,my_service=trace").build();
    /// let bridge = LogBridge::builder(writer).filter(filter).build();
    /// # Ok::<(), logwriter::Error>(())
    /// ```
    pub fn filter(mut self, filter: EnvFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the filter from the environment variable `name`, or from `default` if the variable
    /// is not set.
    pub fn filter_from_env_or<'a, 'b, E, V>(self, name: E, default: V) -> Self
    where
        E: Into<Cow<'a, str>>,
        V: Into<Cow<'b, str>>,
    {
        self.filter(env_filter_or(name, default))
    }

    /// Sets the layout of the lines.
    ///
    /// Default to [`LineLayout::Text`].
    pub fn layout(mut self, layout: LineLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the timezone for timestamps. Otherwise, the system timezone is used.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// Builds the [`LogBridge`].
    pub fn build(self) -> LogBridge {
        let LogBridgeBuilder {
            writer,
            filter,
            layout,
            tz,
        } = self;
        let filter =
            filter.unwrap_or_else(|| env_filter_or(DEFAULT_FILTER_ENV, DEFAULT_FILTER));
        LogBridge {
            writer,
            filter,
            layout,
            tz,
        }
    }

    /// Builds the [`LogBridge`] and installs it as the global [`log`] logger, setting the max
    /// level from its filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger has already been installed.
    pub fn apply(self) -> Result<(), log::SetLoggerError> {
        let bridge = self.build();
        let max_level = bridge.max_level();
        log::set_boxed_logger(Box::new(bridge))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

fn env_filter_or<'a, 'b, E, V>(name: E, default: V) -> EnvFilter
where
    E: Into<Cow<'a, str>>,
    V: Into<Cow<'b, str>>,
{
    let mut builder = EnvFilterBuilder::new();
    let name = name.into();
    let default = default.into();
    if let Ok(s) = std::env::var(&*name) {
        builder.parse(&s);
    } else {
        builder.parse(&default);
    }
    builder.build()
}

/// A [`log::Log`] implementation that appends every accepted record to a [`LogWriter`].
///
/// A record that fails to append is reported on stderr, since [`log::Log::log`] has no way to
/// return the error.
#[derive(Debug)]
pub struct LogBridge {
    writer: Arc<LogWriter>,
    filter: EnvFilter,
    layout: LineLayout,
    tz: Option<TimeZone>,
}

impl LogBridge {
    /// Creates a new [`LogBridgeBuilder`].
    pub fn builder(writer: Arc<LogWriter>) -> LogBridgeBuilder {
        LogBridgeBuilder::new(writer)
    }

    /// The most verbose level this bridge accepts.
    pub fn max_level(&self) -> LevelFilter {
        self.filter.filter()
    }

    /// The writer records are appended to.
    pub fn writer(&self) -> &Arc<LogWriter> {
        &self.writer
    }

    fn now(&self) -> Zoned {
        match self.tz.clone() {
            Some(tz) => Zoned::now().with_time_zone(tz),
            None => Zoned::now(),
        }
    }

    fn append(&self, record: &Record) -> Result<(), Error> {
        match self.layout {
            LineLayout::Text => self.writer.write(&self.format_text(record)),
            LineLayout::Json => {
                let message = record.args().to_string();
                self.writer
                    .write_json_line(&message, &self.json_fields(record))
            }
        }
    }

    fn format_text(&self, record: &Record) -> String {
        let time = self.now();
        let time = time.strftime("%Y-%m-%dT%H:%M:%S.%6f%:z");
        let level = record.level();
        let target = record.target();
        let file = record.file().unwrap_or_default();
        let line = record.line().unwrap_or_default();
        let message = record.args();
        let kvs = KvDisplay::new(record.key_values());

        format!("{time} {level:>5} {target}: {file}:{line} {message}{kvs}\n")
    }

    fn json_fields(&self, record: &Record) -> Map<String, Value> {
        let mut kvs = Map::new();
        let mut visitor = KvCollector { kvs: &mut kvs };
        record.key_values().visit(&mut visitor).ok();

        let mut fields = Map::new();
        let timestamp = self.now();
        fields.insert("timestamp".into(), format!("{timestamp:.6}").into());
        fields.insert("level".into(), record.level().as_str().into());
        fields.insert("target".into(), record.target().into());
        fields.insert("file".into(), record.file().unwrap_or_default().into());
        fields.insert("line".into(), record.line().unwrap_or_default().into());
        fields.insert("kvs".into(), Value::Object(kvs));
        fields
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if !self.filter.matches(record) {
            return;
        }

        if let Err(err) = self.append(record) {
            handle_log_error(record, err);
        }
    }

    fn flush(&self) {}
}

fn handle_log_error(record: &Record, error: Error) {
    let _ = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error:?}
"###,
        args = record.args(),
        record = record,
        error = error,
    );
}

struct KvDisplay<'kvs> {
    kv: &'kvs dyn log::kv::Source,
}

impl<'kvs> KvDisplay<'kvs> {
    fn new(kv: &'kvs dyn log::kv::Source) -> Self {
        Self { kv }
    }
}

impl fmt::Display for KvDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut visitor = KvWriter { writer: f };
        self.kv.visit(&mut visitor).ok();
        Ok(())
    }
}

struct KvWriter<'a, 'kvs> {
    writer: &'kvs mut fmt::Formatter<'a>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KvWriter<'_, 'kvs> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        write!(self.writer, " {key}={value}")?;
        Ok(())
    }
}

struct KvCollector<'a> {
    kvs: &'a mut Map<String, Value>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KvCollector<'_> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.kvs.insert(key.to_string(), value.to_string().into());
        Ok(())
    }
}
