//! AvatarDef Core - Definition and Options Admission Engine
//!
//! # The Five Laws (Non-Negotiable)
//! 1. Allow-Lists, Never Deny-Lists Alone
//! 2. Every Violation Is Reported
//! 3. Validation Never Mutates
//! 4. Bad Input Is a Finding, Not a Crash
//! 5. Renderers Only See Admitted Input

pub mod config;
pub mod document;
pub mod hashing;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod policy;
pub mod violation;

mod shape;

use serde_json::Value;

pub use config::{ConfigError, ValidatorConfig};
pub use document::DocumentValidator;
pub use hashing::{canonical_json, fingerprint};
pub use model::{Dialect, Document, Element, Options};
pub use options::{OptionKey, OptionsValidator};
pub use pipeline::{Gate, GateError};
pub use policy::{
    is_allowed_attribute, is_allowed_element, is_safe_css_value, is_safe_meta_url, is_safe_name,
    is_safe_url,
};
pub use violation::{Subject, ValidationReport, Violation, ViolationCode, ViolationKind};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A validator the [`Gate`] can run: one subject, a total list of findings.
pub trait Validate {
    fn subject(&self) -> Subject;

    /// Every violation in `input`, in traversal order. Empty means valid.
    fn collect(&self, input: &Value) -> Vec<Violation>;
}
