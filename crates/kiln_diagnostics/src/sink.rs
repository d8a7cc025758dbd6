//! Thread-safe diagnostic accumulator with an explicit severity threshold.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A thread-safe accumulator for diagnostics emitted while deciding and
/// executing units of work.
///
/// The sink is the only logging channel of the build core. It keeps diagnostics
/// at or above its threshold and forwards each kept diagnostic to `tracing`, so
/// an embedding application decides presentation by installing a subscriber or
/// by draining the sink. Emitters call [`is_enabled`](Self::is_enabled) before
/// formatting expensive messages.
///
/// A sink built with [`retaining`](Self::retaining) holds at most that many
/// diagnostics, dropping the oldest first. Dropped diagnostics have already
/// been forwarded to `tracing`, and errors among them stay counted.
pub struct DiagnosticSink {
    threshold: Severity,
    retain: usize,
    diagnostics: Mutex<VecDeque<Diagnostic>>,
    error_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates a new empty sink keeping `Info` and above.
    pub fn new() -> Self {
        Self::with_threshold(Severity::Info)
    }

    /// Creates a new empty sink keeping diagnostics at or above `threshold`.
    pub fn with_threshold(threshold: Severity) -> Self {
        Self {
            threshold,
            retain: 0,
            diagnostics: Mutex::new(VecDeque::new()),
            error_count: AtomicUsize::new(0),
        }
    }

    /// Limits the sink to the `retain` most recent diagnostics. Zero means
    /// no limit.
    pub fn retaining(mut self, retain: usize) -> Self {
        self.retain = retain;
        self
    }

    /// Returns the configured threshold.
    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    /// Returns `true` if diagnostics of the given severity are kept.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Records `diag` if its severity passes the threshold, forwarding it to
    /// `tracing` as well. Errors also bump the error counter.
    pub fn emit(&self, diag: Diagnostic) {
        if !self.is_enabled(diag.severity) {
            return;
        }
        forward_to_tracing(&diag);
        if diag.severity == Severity::Error {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        let mut diagnostics = self.diagnostics.lock().unwrap();
        if self.retain > 0 && diagnostics.len() >= self.retain {
            diagnostics.pop_front();
        }
        diagnostics.push_back(diag);
    }

    /// Whether an error has been recorded since the sink was created.
    pub fn has_errors(&self) -> bool {
        self.error_count.load(Ordering::Relaxed) > 0
    }

    /// Number of recorded errors. Draining does not reset it.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Drains the recorded diagnostics in emission order.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.drain(..).collect()
    }

    /// Copies the recorded diagnostics out, leaving them in place.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let diagnostics = self.diagnostics.lock().unwrap();
        diagnostics.iter().cloned().collect()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

fn forward_to_tracing(diag: &Diagnostic) {
    let code = diag.code.to_string();
    let subject = diag.subject.as_deref().unwrap_or("");
    match diag.severity {
        Severity::Debug => tracing::debug!(code = %code, subject, "{}", diag.message),
        Severity::Info => tracing::info!(code = %code, subject, "{}", diag.message),
        Severity::Warning => tracing::warn!(code = %code, subject, "{}", diag.message),
        Severity::Error => tracing::error!(code = %code, subject, "{}", diag.message),
    }
}
