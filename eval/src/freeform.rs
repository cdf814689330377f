// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Freeform consistency: semantic agreement of the explanation with the
//! evidence and with the verdict, without any structure extraction.

use crate::capability::Similarity;
use crate::error::CapabilityError;
use crate::metrics::MetricResult;

pub struct FreeformScorer<'a> {
    similarity: &'a dyn Similarity,
    weight_evidence: f64,
    weight_verdict: f64,
}

impl<'a> FreeformScorer<'a> {
    pub fn new(similarity: &'a dyn Similarity, weight_evidence: f64, weight_verdict: f64) -> Self {
        Self {
            similarity,
            weight_evidence,
            weight_verdict,
        }
    }

    /// Score an explanation against its evidence spans and the rendered verdict statement
    pub fn score<S: AsRef<str>>(
        &self,
        evidence: &[S],
        verdict_statement: &str,
        explanation: &str,
    ) -> Result<MetricResult, CapabilityError> {
        let verdict_alignment = self.similarity.similarity(explanation, verdict_statement)?;

        let spans: Vec<&str> = evidence
            .iter()
            .map(|e| e.as_ref())
            .filter(|e| !e.trim().is_empty())
            .collect();

        if spans.is_empty() {
            let mut result =
                MetricResult::scored(verdict_alignment).with_metric("verdict_alignment", verdict_alignment);
            result.warn("no evidence spans; score uses verdict alignment only");
            return Ok(result);
        }

        let mut sims = Vec::with_capacity(spans.len());
        for span in spans {
            sims.push(self.similarity.similarity(explanation, span)?);
        }
        let evidence_alignment = sims.iter().sum::<f64>() / sims.len() as f64;
        let evidence_max = sims.iter().copied().fold(0.0, f64::max);

        let score = (self.weight_evidence * evidence_alignment + self.weight_verdict * verdict_alignment)
            / (self.weight_evidence + self.weight_verdict);

        Ok(MetricResult::scored(score)
            .with_metric("evidence_alignment", evidence_alignment)
            .with_metric("evidence_max", evidence_max)
            .with_metric("verdict_alignment", verdict_alignment))
    }
}
