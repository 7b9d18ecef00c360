//! Logstash appender
//!
//! Ships records to a Logstash TCP input (`json_lines` codec). Formatting
//! happens on the logging thread; the socket is owned by a background worker
//! fed through a bounded queue, so logging never blocks on the network and
//! never sees transport errors.

use super::logstash_formatter::LogstashFormatter;
use crate::core::{Appender, LogEntry, LogLevel, LoggerError, LoggerMetrics, Result};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use std::io::Write;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default time `flush` and `Drop` wait for queued documents to be sent
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Alert on the first occurrence and then every this many
const ALERT_INTERVAL: u64 = 1000;

fn should_alert(previous: u64) -> bool {
    previous == 0 || (previous + 1) % ALERT_INTERVAL == 0
}

/// Work items for the sender thread
enum Command {
    /// One newline-terminated document
    Send(String),
    /// Answered once everything queued before it has been written
    Flush(Sender<()>),
}

/// Worker-side TCP connection, opened on first use
struct LogstashTransport {
    host: String,
    port: u16,
    stream: Option<TcpStream>,
}

impl LogstashTransport {
    fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            stream: None,
        }
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connect(&self) -> Result<TcpStream> {
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| LoggerError::connection(self.address(), e.to_string()))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(LoggerError::connection(
            self.address(),
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "host resolved to no addresses".to_string()),
        ))
    }

    fn write(&mut self, line: &str) -> Result<()> {
        let mut stream = match self.stream.take() {
            Some(stream) => stream,
            None => self.connect()?,
        };

        stream
            .write_all(line.as_bytes())
            .map_err(|e| LoggerError::io_operation("sending to logstash", self.address(), e))?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Write one line, reconnecting once if the first attempt fails
    fn send(&mut self, line: &str) -> Result<()> {
        match self.write(line) {
            Ok(()) => Ok(()),
            Err(first) => self.write(line).map_err(|retry| {
                LoggerError::writer(format!(
                    "Failed to send log and reconnect: {} (reconnect: {})",
                    first, retry
                ))
            }),
        }
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut stream) = self.stream {
            stream.flush()?;
        }
        Ok(())
    }
}

fn run_worker(
    receiver: Receiver<Command>,
    mut transport: LogstashTransport,
    metrics: Arc<LoggerMetrics>,
) {
    for command in receiver.iter() {
        match command {
            Command::Send(line) => match transport.send(&line) {
                Ok(()) => {
                    metrics.record_logged();
                }
                Err(e) => {
                    let failures = metrics.record_send_failure();
                    if should_alert(failures) {
                        eprintln!(
                            "[LOGGER ERROR] Logstash delivery failed ({} total): {}",
                            failures + 1,
                            e
                        );
                    }
                }
            },
            Command::Flush(ack) => {
                if let Err(e) = transport.flush() {
                    eprintln!("[LOGGER ERROR] Failed to flush logstash connection: {}", e);
                }
                // The flushing side may have given up waiting
                let _ = ack.send(());
            }
        }
    }

    if let Err(e) = transport.flush() {
        eprintln!("[LOGGER ERROR] Failed to flush logstash connection: {}", e);
    }
}

/// Appender that forwards records to Logstash
///
/// # Example
///
/// ```no_run
/// use elk_logger::appenders::{LogstashAppender, LogstashFormatter};
/// use elk_logger::prelude::*;
///
/// let appender = LogstashAppender::new("logstash.internal", 5959)
///     .with_formatter(LogstashFormatter::new().with_project("billing"));
///
/// let logger = Logger::builder("billing").appender(appender).build();
/// logger.info("invoice issued");
/// ```
pub struct LogstashAppender {
    address: String,
    formatter: LogstashFormatter,
    level: LogLevel,
    sender: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
    metrics: Arc<LoggerMetrics>,
}

impl LogstashAppender {
    /// Appender with the default queue capacity
    ///
    /// No connection is made until the first record is sent.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_capacity(host, port, crate::core::DEFAULT_QUEUE_CAPACITY)
    }

    /// Appender whose queue holds at most `capacity` pending documents
    pub fn with_capacity(host: impl Into<String>, port: u16, capacity: usize) -> Self {
        let host = host.into();
        let address = format!("{}:{}", host, port);
        let (sender, receiver) = bounded(capacity.max(1));
        let metrics = Arc::new(LoggerMetrics::new());
        let worker_metrics = Arc::clone(&metrics);
        let transport = LogstashTransport::new(host, port);

        let spawned = thread::Builder::new()
            .name("logstash-sender".to_string())
            .spawn(move || run_worker(receiver, transport, worker_metrics));

        let (sender, worker) = match spawned {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                eprintln!(
                    "[LOGGER ERROR] Could not start logstash worker for {}: {}",
                    address, e
                );
                (None, None)
            }
        };

        Self {
            address,
            formatter: LogstashFormatter::new(),
            level: LogLevel::Debug,
            sender,
            worker,
            metrics,
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: LogstashFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn formatter(&self) -> &LogstashFormatter {
        &self.formatter
    }

    /// Counters shared with the worker thread
    pub fn metrics(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Close the queue and wait for the worker to send what is left
    ///
    /// Returns `false` if the worker did not finish within `timeout` or
    /// panicked. Records appended afterwards are counted as dropped.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!(
                        "[LOGGER ERROR] Logstash worker panicked during shutdown: {:?}",
                        e
                    );
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Logstash worker did not finish within {:?}. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    /// [`flush`](Appender::flush) with an explicit deadline
    pub fn flush_within(&self, timeout: Duration) -> Result<()> {
        let Some(ref sender) = self.sender else {
            return Ok(());
        };

        let deadline = Instant::now() + timeout;
        let (ack_sender, ack_receiver) = bounded(1);

        match sender.send_timeout(Command::Flush(ack_sender), timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Disconnected(_)) => return Ok(()),
            Err(SendTimeoutError::Timeout(_)) => {
                return Err(LoggerError::writer(format!(
                    "Logstash queue for {} still full after {:?}",
                    self.address, timeout
                )));
            }
        }

        ack_receiver
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .map_err(|_| {
                LoggerError::writer(format!(
                    "Logstash worker for {} did not drain within {:?}",
                    self.address, timeout
                ))
            })
    }

    fn alert_and_drop(&self) {
        self.metrics.record_queue_full();
        let dropped = self.metrics.record_dropped();

        if should_alert(dropped) {
            eprintln!(
                "[LOGGER WARNING] Logstash queue full, {} logs dropped. \
                 Consider increasing queue_capacity.",
                dropped + 1
            );
        }
    }
}

impl Appender for LogstashAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let Some(ref sender) = self.sender else {
            self.metrics.record_dropped();
            return Ok(());
        };

        let mut line = self.formatter.format(entry)?;
        line.push('\n');

        match sender.try_send(Command::Send(line)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.alert_and_drop(),
            Err(TrySendError::Disconnected(_)) => {
                self.metrics.record_dropped();
            }
        }
        Ok(())
    }

    /// Block until every document queued so far has been written
    ///
    /// Waits at most [`DEFAULT_SHUTDOWN_TIMEOUT`]. Documents the worker
    /// could not deliver are counted in [`metrics`](Self::metrics), not
    /// reported here.
    fn flush(&mut self) -> Result<()> {
        self.flush_within(DEFAULT_SHUTDOWN_TIMEOUT)
    }

    fn name(&self) -> &str {
        "logstash"
    }

    fn level(&self) -> LogLevel {
        self.level
    }
}

impl Drop for LogstashAppender {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);

        let dropped = self.metrics.dropped_count();
        if dropped > 0 {
            eprintln!(
                "[LOGGER WARNING] Logstash appender for {} shutting down with {} dropped logs \
                 (drop rate: {:.2}%)",
                self.address,
                dropped,
                self.metrics.drop_rate()
            );
        }
    }
}
