//! Violation Accumulator - Findings, Not Failures
//!
//! Validators never stop at the first problem. Every rule failure is pushed
//! into a [`Collector`] together with the JSON Pointer of the offending value,
//! and the caller receives the complete list as a [`ValidationReport`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad class of a violation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Shape problems: missing/unknown fields, wrong types, ranges, arity.
    Structural,
    /// Anything that could lead to script execution, exfiltration or
    /// prototype corruption downstream.
    Security,
    /// An engine-imposed bound was hit; the input was not fully inspected.
    ResourceLimit,
}

/// Machine-readable reason code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    MissingField,
    UnknownField,
    ForbiddenField,
    DuplicateField,
    WrongType,
    OutOfRange,
    InvalidArity,
    PatternMismatch,
    InvalidEnumValue,
    DialectMismatch,

    DisallowedElement,
    DisallowedAttribute,
    EventHandlerAttribute,
    NamespaceAttribute,
    UnsafeUrl,
    UnsafeCss,
    UnsafeName,
    UnknownVariable,
    ReservedKey,

    ResourceLimitExceeded,
}

impl ViolationCode {
    pub fn kind(self) -> ViolationKind {
        use ViolationCode::*;
        match self {
            MissingField | UnknownField | ForbiddenField | DuplicateField | WrongType
            | OutOfRange | InvalidArity | PatternMismatch | InvalidEnumValue
            | DialectMismatch => ViolationKind::Structural,
            DisallowedElement | DisallowedAttribute | EventHandlerAttribute
            | NamespaceAttribute | UnsafeUrl | UnsafeCss | UnsafeName | UnknownVariable
            | ReservedKey => ViolationKind::Security,
            ResourceLimitExceeded => ViolationKind::ResourceLimit,
        }
    }

    pub fn as_str(self) -> &'static str {
        use ViolationCode::*;
        match self {
            MissingField => "missing_field",
            UnknownField => "unknown_field",
            ForbiddenField => "forbidden_field",
            DuplicateField => "duplicate_field",
            WrongType => "wrong_type",
            OutOfRange => "out_of_range",
            InvalidArity => "invalid_arity",
            PatternMismatch => "pattern_mismatch",
            InvalidEnumValue => "invalid_enum_value",
            DialectMismatch => "dialect_mismatch",
            DisallowedElement => "disallowed_element",
            DisallowedAttribute => "disallowed_attribute",
            EventHandlerAttribute => "event_handler_attribute",
            NamespaceAttribute => "namespace_attribute",
            UnsafeUrl => "unsafe_url",
            UnsafeCss => "unsafe_css",
            UnsafeName => "unsafe_name",
            UnknownVariable => "unknown_variable",
            ReservedKey => "reserved_key",
            ResourceLimitExceeded => "resource_limit_exceeded",
        }
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer (RFC 6901) to the offending value; empty for the root.
    pub path: String,
    pub code: ViolationCode,
    pub kind: ViolationKind,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{} [{}]: {}", path, self.code, self.message)
    }
}

/// What kind of input a report describes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Definition,
    Options,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Definition => f.write_str("definition"),
            Subject::Options => f.write_str("options"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub subject: Subject,
    pub valid: bool,
    pub violations: Vec<Violation>,
    /// SHA-256 of the canonical JSON form of the validated input.
    pub fingerprint: String,
}

impl ValidationReport {
    pub fn success(subject: Subject, fingerprint: String) -> Self {
        Self {
            subject,
            valid: true,
            violations: vec![],
            fingerprint,
        }
    }

    pub fn failure(subject: Subject, fingerprint: String, violations: Vec<Violation>) -> Self {
        Self {
            subject,
            valid: false,
            violations,
            fingerprint,
        }
    }

    /// A single violation anywhere makes the whole input invalid.
    pub fn from_violations(subject: Subject, fingerprint: String, violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            Self::success(subject, fingerprint)
        } else {
            Self::failure(subject, fingerprint, violations)
        }
    }

    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    pub fn has_security_violations(&self) -> bool {
        self.has_kind(ViolationKind::Security)
    }

    pub fn has_code(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    pub fn at_path(&self, path: &str) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.path == path).collect()
    }

    /// One-line summary used in error messages and logs.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Escape one reference token per RFC 6901.
fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Accumulates violations while tracking the current JSON Pointer.
#[derive(Debug, Default)]
pub struct Collector {
    segments: Vec<String>,
    violations: Vec<Violation>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("/{}", escape_token(s)))
            .collect()
    }

    pub fn enter(&mut self, segment: impl ToString) {
        self.segments.push(segment.to_string());
    }

    pub fn leave(&mut self) {
        self.segments.pop();
    }

    /// Run `f` with `segment` appended to the current path.
    pub fn at<R>(&mut self, segment: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.enter(segment);
        let out = f(self);
        self.leave();
        out
    }

    pub fn report(&mut self, code: ViolationCode, message: impl Into<String>) {
        let violation = Violation {
            path: self.path(),
            code,
            kind: code.kind(),
            message: message.into(),
        };
        self.violations.push(violation);
    }

    /// Report at a child of the current path without entering it.
    pub fn report_at(&mut self, segment: impl ToString, code: ViolationCode, message: impl Into<String>) {
        self.at(segment, |c| c.report(code, message));
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}
