//! mp3-recorder - record live audio to MP3
//!
//! This crate wires a live audio input into a background MP3 encoding
//! worker. Audio blocks are relayed to the worker while recording; on stop
//! the worker flushes and the encoded chunks are delivered to the host as
//! one MP3 object.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session state machine, value objects, worker protocol, errors
//! - **Application**: The recording engine and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, LAME workers, config store)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
