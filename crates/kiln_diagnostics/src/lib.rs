//! Diagnostic creation, severity gating, and terminal rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity levels
//! and codes. The thread-safe [`DiagnosticSink`] accumulates diagnostics emitted
//! while units of work are being decided and executed, filters them against an
//! explicit threshold, and forwards them to `tracing`. [`DiagnosticRenderer`]
//! implementations format them for display.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::{ParseSeverityError, Severity};
pub use sink::DiagnosticSink;
