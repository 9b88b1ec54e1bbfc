// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025 The secpart Authors

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;

/// A console device to output data. Implemented by the hosting kernel.
pub trait ConsoleSink: fmt::Debug + Sync + Send {
    fn write_str(&self, s: &str);
}

struct SinkWriter<'a>(&'a dyn ConsoleSink);

impl fmt::Write for SinkWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.write_str(s);
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct ConsoleLogger {
    name: &'static str,
    sink: &'static dyn ConsoleSink,
}

impl ConsoleLogger {
    const fn new(name: &'static str, sink: &'static dyn ConsoleSink) -> Self {
        Self { name, sink }
    }
}

// Log format/detail depends on the level.
fn format_record(
    out: &mut dyn fmt::Write,
    name: &str,
    record: &log::Record<'_>,
) -> fmt::Result {
    let level = record.metadata().level();

    match level {
        log::Level::Error | log::Level::Warn => {
            writeln!(out, "[{}] {}: {}", name, level.as_str(), record.args())
        }
        log::Level::Info => writeln!(out, "[{}] {}", name, record.args()),
        log::Level::Debug | log::Level::Trace => writeln!(
            out,
            "[{}/{}] {} {}",
            name,
            record.metadata().target(),
            level.as_str(),
            record.args()
        ),
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let _ = format_record(&mut SinkWriter(self.sink), self.name, record);
    }

    fn flush(&self) {}
}

/// Routes the `log` facade to `sink`, prefixing every line with
/// `component`.
pub fn install_console_logger(component: &'static str, sink: &'static dyn ConsoleSink) {
    let logger = Box::leak(Box::new(ConsoleLogger::new(component, sink)));

    if let Err(e) = log::set_logger(logger) {
        // Presumably another logger was installed before; no logs will reach
        // this sink.
        let _ = fmt::write(
            &mut SinkWriter(sink),
            format_args!(
                "[{}]: ERROR: failed to install console logger: {:?}\n",
                component, e
            ),
        );
    }

    // Log levels are to be configured via the log's library feature configuration.
    log::set_max_level(log::LevelFilter::Trace);
}
