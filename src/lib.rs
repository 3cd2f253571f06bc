//! Braille trainer - chord keyboard practice with spoken dictations
//!
//! This library exports core modules for testing and for the binary.

/// Curriculum units and their training words
pub mod catalog;
/// Six-dot chord decoding
pub mod chord;
/// Configuration management
pub mod config;
/// Dictation state machine and daily planning
pub mod dictation;
/// Student progress records and their storage
pub mod progress;
/// Plain-text progress report
pub mod report;
/// Speech and sound cue output
pub mod speech;
/// Logging setup
pub mod telemetry;
/// Keypad trainer driving the decoder and the dictation engine
pub mod trainer;
