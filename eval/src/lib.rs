// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Faithfulness evaluation for fact-checking explanations
//!
//! This crate provides:
//! - Argument structure extraction from free-text explanations
//! - Argumentative faithfulness against reference argument structures
//! - Deductive consistency (premise grounding and verdict entailment)
//! - Freeform consistency of explanation, evidence and verdict
//! - Dialectical properties: circularity, acceptability, strength/confidence agreement
//! - Pluggable entailment and similarity capabilities with a lexical default
//! - Batch scoring with per-item failure isolation and aggregate statistics

pub mod argumentative;
pub mod capability;
pub mod config;
pub mod deductive;
pub mod dialectics;
pub mod error;
pub mod extraction;
pub mod freeform;
pub mod graph;
pub mod instance;
pub mod metrics;
pub mod pipeline;
mod text;

pub use argumentative::{AlignedPair, AlignmentSummary, ArgumentativeScorer};
pub use capability::{release_shared, shared_lexical, Capabilities, Entailment, LexicalNli, Similarity};
pub use config::{DialecticalConfig, ExtractionConfig, MetricsConfig};
pub use deductive::{DeductiveChecker, DeductiveResult};
pub use error::{CapabilityError, ConfigError, ExtractionError, FaithError, FaithResult};
pub use extraction::ArgumentExtractor;
pub use freeform::FreeformScorer;
pub use graph::{ArgumentGraph, Edge, Proposition, ReferenceStructure, Relation, Role};
pub use instance::{Instance, Verdict, VerdictTemplates};
pub use metrics::{BatchReport, MetricDetail, MetricResult, SummaryStats};
pub use pipeline::{
    argumentative_metrics, deductive_metrics, freeform_metrics, EvaluationConfig, EvaluationPipeline,
};
