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

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use logwriter::ErrorKind;
use logwriter::LogWriter;
use rand::Rng;
use rand::distr::Alphanumeric;
use tempfile::TempDir;

const THREADS: usize = 16;
const LINES_PER_THREAD: usize = 200;

fn random_payload(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[test]
fn test_concurrent_lines_are_never_interleaved() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("concurrent.log");
    let writer = Arc::new(LogWriter::open(&path).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles = (0..THREADS)
        .map(|t| {
            let writer = writer.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let mut expected = Vec::with_capacity(LINES_PER_THREAD);
                barrier.wait();
                for i in 0..LINES_PER_THREAD {
                    // long enough payloads to make torn writes visible
                    let line = format!("{t}-{i}-{}\n", random_payload(512));
                    writer.write(&line).unwrap();
                    expected.push(line.trim_end().to_string());
                }
                expected
            })
        })
        .collect::<Vec<_>>();

    let mut expected = HashSet::new();
    for handle in handles {
        expected.extend(handle.join().unwrap());
    }
    writer.close().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.ends_with('\n'));
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), THREADS * LINES_PER_THREAD);

    let written = lines.iter().map(|line| line.to_string()).collect::<HashSet<_>>();
    assert_eq!(written.len(), lines.len(), "a line was written twice");
    assert_eq!(written, expected);
}

#[test]
fn test_concurrent_formatting_variants() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("variants.log");
    let writer = Arc::new(LogWriter::open(&path).unwrap());

    let handles = (0..THREADS)
        .map(|t| {
            let writer = writer.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    match i % 3 {
                        0 => logwriter::write_line!(writer, "thread", t, "line", i).unwrap(),
                        1 => logwriter::write_formatted!(writer, "thread %d line %d\n", t, i)
                            .unwrap(),
                        _ => writer
                            .write_json_line("line", &serde_json::json!({"thread": t, "i": i}))
                            .unwrap(),
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), THREADS * 50);
    for line in lines {
        if line.starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["message"], "line");
        } else {
            let words = line.split(' ').collect::<Vec<_>>();
            assert_eq!(words.len(), 4, "{line}");
            assert_eq!(words[0], "thread");
            assert_eq!(words[2], "line");
        }
    }
}

#[test]
fn test_close_races_with_writers() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("close.log");
    let writer = Arc::new(LogWriter::open(&path).unwrap());

    let handles = (0..4)
        .map(|t| {
            let writer = writer.clone();
            thread::spawn(move || {
                let mut written = 0;
                for i in 0..1000 {
                    match writer.write(&format!("{t}:{i}\n")) {
                        Ok(()) => written += 1,
                        Err(err) => {
                            assert_eq!(err.kind(), ErrorKind::Io);
                            assert_eq!(err.message(), "file already closed");
                            break;
                        }
                    }
                }
                written
            })
        })
        .collect::<Vec<_>>();

    writer.close().unwrap();
    let written: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), written);
    assert!(content.is_empty() || content.ends_with('\n'));
}
