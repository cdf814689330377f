// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Error taxonomy for the faithfulness engine
//!
//! - `ExtractionError`: an explanation could not be segmented into propositions
//! - `ConfigError`: the batch or configuration is unusable as a whole
//! - `CapabilityError`: an entailment/similarity provider failed on one pair

use thiserror::Error;

/// Explanation text could not be turned into an argument graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("explanation is not natural language (letter ratio {ratio:.2} below {min_ratio:.2})")]
    NotNaturalLanguage { ratio: f64, min_ratio: f64 },
    #[error("explanation contains no words")]
    NoWords,
}

/// Fatal, batch-level configuration problems
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("argumentative metrics require one reference structure per instance")]
    MissingReferences,
    #[error("reference count {references} does not match batch size {instances}")]
    ReferenceLengthMismatch { instances: usize, references: usize },
    #[error("reference structure {index} is malformed: {reason}")]
    MalformedReference { index: usize, reason: String },
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("invalid discourse cue pattern: {0}")]
    CuePattern(String),
}

/// A capability provider failed for a given pair of texts
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{provider} failed: {message}")]
pub struct CapabilityError {
    pub provider: String,
    pub message: String,
}

impl CapabilityError {
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Top-level error for the engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaithError {
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
}

pub type FaithResult<T> = Result<T, FaithError>;
