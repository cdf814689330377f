// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Configuration for the metric families
//!
//! Every threshold and cue list used by the heuristics lives here so the
//! engine can be tuned (and tested) without code changes.

use crate::error::ConfigError;
use crate::instance::VerdictTemplates;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognised options for all three metric families
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Weight of the evidence-alignment mean in the freeform score
    pub freeform_weight_evidence: f64,
    /// Weight of the verdict alignment in the freeform score
    pub freeform_weight_verdict: f64,
    /// Minimum similarity for two propositions to be aligned
    pub alignment_similarity_threshold: f64,
    /// Route extraction failures of argumentative items to the freeform scorer
    pub fallback_on_extraction_failure: bool,
    /// Entailment score at or above which a pair counts as entailed
    pub entailment_threshold: f64,
    /// Score batch items on the rayon pool
    pub parallel: bool,
    pub extraction: ExtractionConfig,
    pub dialectical: DialecticalConfig,
    pub verdict_templates: VerdictTemplates,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            freeform_weight_evidence: 0.5,
            freeform_weight_verdict: 0.5,
            alignment_similarity_threshold: 0.7,
            fallback_on_extraction_failure: true,
            entailment_threshold: 0.5,
            parallel: true,
            extraction: ExtractionConfig::default(),
            dialectical: DialecticalConfig::default(),
            verdict_templates: VerdictTemplates::default(),
        }
    }
}

/// Heuristics of the argument structure extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Cues introducing a conclusion ("X, so Y")
    pub conclusion_cues: Vec<String>,
    /// Cues introducing a premise ("Y because X")
    pub premise_cues: Vec<String>,
    /// Cues marking a conceded point, which attacks the conclusion
    pub concessive_cues: Vec<String>,
    /// Cues marking that the preceding unit is countered
    pub adversative_cues: Vec<String>,
    /// Cues that only split after `,` `;` `:` or at sentence start
    pub weak_cues: Vec<String>,
    /// Minimum letter ratio for text to count as natural language
    pub min_alpha_ratio: f64,
    /// Minimum similarity to the verdict statement for a unit to be chosen as conclusion
    pub conclusion_similarity_threshold: f64,
    /// Minimum similarity between an unlinked premise and the conclusion to draw an edge
    pub min_relation_similarity: f64,
    /// Overlap above which opposite negation polarity turns a premise into an attack
    pub polarity_overlap_threshold: f64,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            conclusion_cues: strings(&[
                "therefore",
                "thus",
                "hence",
                "consequently",
                "which means",
                "so",
            ]),
            premise_cues: strings(&["because", "since", "given that", "as shown by"]),
            concessive_cues: strings(&["although", "even though", "though", "despite", "while"]),
            adversative_cues: strings(&["however", "but", "nevertheless", "nonetheless", "yet"]),
            weak_cues: strings(&["so", "since", "while", "yet"]),
            min_alpha_ratio: 0.5,
            conclusion_similarity_threshold: 0.3,
            min_relation_similarity: 0.0,
            polarity_overlap_threshold: 0.5,
        }
    }
}

/// Confidence and strength thresholds for dialectical faithfulness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialecticalConfig {
    pub top_confidence: f64,
    pub high_confidence: f64,
    pub weak_strength: f64,
}

impl Default for DialecticalConfig {
    fn default() -> Self {
        Self {
            top_confidence: 0.9,
            high_confidence: 0.7,
            weak_strength: 0.5,
        }
    }
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{} is outside [0, 1]", value),
        })
    }
}

impl MetricsConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("Failed to parse metrics config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read metrics config: {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid metrics config: {}", path.display()))
    }

    /// Reject values the scorers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, weight) in [
            ("freeform_weight_evidence", self.freeform_weight_evidence),
            ("freeform_weight_verdict", self.freeform_weight_verdict),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("weight {} must be finite and non-negative", weight),
                });
            }
        }
        if self.freeform_weight_evidence + self.freeform_weight_verdict <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "freeform_weight_evidence",
                reason: "freeform weights must not both be zero".to_string(),
            });
        }
        unit_interval("alignment_similarity_threshold", self.alignment_similarity_threshold)?;
        unit_interval("entailment_threshold", self.entailment_threshold)?;

        let ex = &self.extraction;
        unit_interval("extraction.min_alpha_ratio", ex.min_alpha_ratio)?;
        unit_interval("extraction.conclusion_similarity_threshold", ex.conclusion_similarity_threshold)?;
        unit_interval("extraction.min_relation_similarity", ex.min_relation_similarity)?;
        unit_interval("extraction.polarity_overlap_threshold", ex.polarity_overlap_threshold)?;

        let dc = &self.dialectical;
        unit_interval("dialectical.top_confidence", dc.top_confidence)?;
        unit_interval("dialectical.high_confidence", dc.high_confidence)?;
        unit_interval("dialectical.weak_strength", dc.weak_strength)?;
        if dc.high_confidence > dc.top_confidence {
            return Err(ConfigError::InvalidValue {
                field: "dialectical.high_confidence",
                reason: "must not exceed top_confidence".to_string(),
            });
        }
        Ok(())
    }
}
