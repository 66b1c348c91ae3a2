//! Cistercian Core - Component-Based Numeral Compositor
//!
//! # Ground Rules
//! 1. Numbers live in 1..=9999, nothing else renders
//! 2. Components are supplied, never drawn
//! 3. A missing component is omitted, not an error
//! 4. Overlay order is fixed: thousands, hundreds, tens, units
//! 5. Same library, same number, same pixels

pub mod numeral;
pub mod config;
pub mod library;
pub mod hashing;
pub mod validation;
pub mod compositor;

pub use numeral::{Numeral, NumeralError, Place, BreakdownEntry, decompose, breakdown};
pub use config::{CompositorConfig, ResampleFilter, ConfigError};
pub use library::{ComponentLibrary, ComponentKey, DigitComponent, LoadReport, LibraryError};
pub use hashing::{compute_image_hash, compute_job_hash, library_fingerprint, canonical_json};
pub use validation::{Auditor, AuditReport, ComponentRule, AuditViolation, ViolationSeverity};
pub use compositor::{Compositor, RenderedNumeral, ComponentUsage, UsageStatus, CompositorError, encode_png};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DEFAULT_ASSET_DIR: &str = "cistercian_components";
