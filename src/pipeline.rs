//! Admission Gate - Single Entry Point
//!
//! CRITICAL: admit_definition and admit_options MUST validate internally.
//! A typed Document or Options only ever comes out of a passing report.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ValidatorConfig};
use crate::document::DocumentValidator;
use crate::hashing::fingerprint;
use crate::model::{Document, Options};
use crate::options::OptionsValidator;
use crate::violation::{Subject, ValidationReport};
use crate::Validate;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum GateError {
    #[error("{subject} rejected with {count} violation(s): {summary}")]
    Rejected {
        subject: Subject,
        count: usize,
        summary: String,
    },

    #[error("Validated input could not be materialised: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// The admission gate: every definition or options value a renderer sees
/// has been through here.
#[derive(Debug, Clone, Default)]
pub struct Gate {
    documents: DocumentValidator,
    options: OptionsValidator,
}

impl Gate {
    /// Builds a gate over `config`, refusing limits that would reject
    /// everything.
    pub fn new(config: ValidatorConfig) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self {
            documents: DocumentValidator::new(config),
            options: OptionsValidator::new(config),
        })
    }

    pub fn config(&self) -> &ValidatorConfig {
        self.documents.config()
    }

    /// Full report for a candidate definition.
    pub fn check_definition(&self, input: &Value) -> ValidationReport {
        run(&self.documents, input)
    }

    /// Full report for a candidate options map.
    pub fn check_options(&self, input: &Value) -> ValidationReport {
        run(&self.options, input)
    }

    pub fn is_valid_definition(&self, input: &Value) -> bool {
        self.check_definition(input).valid
    }

    pub fn is_valid_options(&self, input: &Value) -> bool {
        self.check_options(input).valid
    }

    /// Validate, then materialise the typed document.
    ///
    /// CRITICAL: This ALWAYS validates first. No bypass possible.
    pub fn admit_definition(&self, input: &Value) -> Result<Document, GateError> {
        admit(&self.documents, input)
    }

    /// Validate, then materialise the typed options.
    ///
    /// CRITICAL: This ALWAYS validates first. No bypass possible.
    pub fn admit_options(&self, input: &Value) -> Result<Options, GateError> {
        admit(&self.options, input)
    }
}

fn run(validator: &impl Validate, input: &Value) -> ValidationReport {
    #[cfg(feature = "test-hooks")]
    VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

    let subject = validator.subject();
    let fingerprint = fingerprint(input);
    debug!(%subject, %fingerprint, "validating");

    let report = ValidationReport::from_violations(subject, fingerprint, validator.collect(input));
    if report.valid {
        info!(%subject, fingerprint = %report.fingerprint, "accepted");
    } else {
        warn!(
            %subject,
            fingerprint = %report.fingerprint,
            violations = report.violations.len(),
            security = report.has_security_violations(),
            "rejected"
        );
    }
    report
}

fn admit<T: DeserializeOwned>(validator: &impl Validate, input: &Value) -> Result<T, GateError> {
    // MANDATORY: the report decides, deserialisation only follows a pass.
    let report = run(validator, input);
    if !report.valid {
        warn!(subject = %report.subject, "admission refused");
        return Err(GateError::Rejected {
            subject: report.subject,
            count: report.violations.len(),
            summary: report.summary(),
        });
    }
    Ok(serde_json::from_value(input.clone())?)
}
