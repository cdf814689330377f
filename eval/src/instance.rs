// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Fact-check instances handed to the engine by the generation pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Verdict of the fact-checking model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Evidence supports the claim
    Supported,
    /// Evidence contradicts the claim
    Refuted,
    /// Evidence is insufficient either way
    NotEnoughInfo,
}

impl Verdict {
    /// Map a dataset label (FEVER style or plain) to a verdict
    pub fn from_label(label: &str) -> Option<Self> {
        let normalised: String = label
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '_' || c == '-' { ' ' } else { c })
            .collect();
        match normalised.as_str() {
            "supports" | "supported" | "support" | "true" | "entailment" => Some(Verdict::Supported),
            "refutes" | "refuted" | "refute" | "false" | "contradiction" => Some(Verdict::Refuted),
            "not enough info" | "not enough information" | "nei" | "nei info" | "neutral" => {
                Some(Verdict::NotEnoughInfo)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Supported => "SUPPORTED",
            Verdict::Refuted => "REFUTED",
            Verdict::NotEnoughInfo => "NOT_ENOUGH_INFO",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("unknown verdict label '{}'", s))
    }
}

/// Templates turning a verdict into a statement about the claim.
/// `{claim}` is replaced by the claim text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictTemplates {
    pub supported: String,
    pub refuted: String,
    pub not_enough_info: String,
}

impl Default for VerdictTemplates {
    fn default() -> Self {
        Self {
            supported: "The claim that {claim} is supported.".to_string(),
            refuted: "The claim that {claim} is refuted.".to_string(),
            not_enough_info: "There is not enough information to verify the claim that {claim}."
                .to_string(),
        }
    }
}

impl VerdictTemplates {
    /// Render the verdict statement for a claim
    pub fn statement(&self, verdict: Verdict, claim: &str) -> String {
        let template = match verdict {
            Verdict::Supported => &self.supported,
            Verdict::Refuted => &self.refuted,
            Verdict::NotEnoughInfo => &self.not_enough_info,
        };
        let claim = claim.trim().trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'));
        template.replace("{claim}", claim)
    }
}

/// One fact-check unit. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(default)]
    id: Option<String>,
    claim: String,
    evidence: Vec<String>,
    verdict: Verdict,
    explanation: String,
    /// Model confidence in the verdict (0.0 to 1.0), if reported
    #[serde(default)]
    confidence: Option<f64>,
}

impl Instance {
    pub fn new(
        claim: impl Into<String>,
        evidence: Vec<String>,
        verdict: Verdict,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            claim: claim.into(),
            evidence,
            verdict,
            explanation: explanation.into(),
            confidence: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn claim(&self) -> &str {
        &self.claim
    }

    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    /// Identifier for log lines: explicit id or batch position
    pub fn label(&self, position: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("#{}", position))
    }
}
