// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Batch evaluation of explanation faithfulness
//!
//! Orchestrates:
//! - Configuration and reference validation (fatal, before any scoring)
//! - Argument structure extraction
//! - Argumentative, deductive and freeform scoring per instance
//! - Failure isolation: a failing item becomes undefined, never the batch
//! - Aggregation into a `BatchReport`

use crate::argumentative::{AlignmentSummary, ArgumentativeScorer};
use crate::capability::Capabilities;
use crate::config::MetricsConfig;
use crate::deductive::DeductiveChecker;
use crate::dialectics::{circularity, dialectical_acceptability, dialectical_faithfulness};
use crate::error::{ConfigError, FaithError};
use crate::extraction::ArgumentExtractor;
use crate::freeform::FreeformScorer;
use crate::graph::{ArgumentGraph, ReferenceStructure};
use crate::instance::Instance;
use crate::metrics::{BatchReport, MetricDetail, MetricResult};
use rayon::prelude::*;

/// Metric settings plus the capability providers to score with
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub metrics: MetricsConfig,
    pub capabilities: Capabilities,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            metrics: MetricsConfig::default(),
            capabilities: Capabilities::lexical(),
        }
    }
}

impl EvaluationConfig {
    pub fn new(metrics: MetricsConfig, capabilities: Capabilities) -> Self {
        Self { metrics, capabilities }
    }
}

/// Main evaluation pipeline
pub struct EvaluationPipeline {
    config: MetricsConfig,
    capabilities: Capabilities,
    extractor: ArgumentExtractor,
}

impl EvaluationPipeline {
    pub fn new(config: EvaluationConfig) -> Result<Self, FaithError> {
        config.metrics.validate()?;
        let extractor = ArgumentExtractor::new(&config.metrics.extraction)?;
        Ok(Self {
            config: config.metrics,
            capabilities: config.capabilities,
            extractor,
        })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Score each instance against its reference argument structure
    pub fn argumentative_metrics(
        &self,
        batch: &[Instance],
        references: Option<&[ReferenceStructure]>,
    ) -> Result<BatchReport, FaithError> {
        let references = Self::validate_references(batch, references)?;
        Ok(self.score_batch("argumentative", batch, |position, instance| {
            self.argumentative_item(position, instance, &references[position])
        }))
    }

    /// Check premise grounding and verdict entailment per instance.
    /// References are not used.
    pub fn deductive_metrics(
        &self,
        batch: &[Instance],
        _references: Option<&[ReferenceStructure]>,
    ) -> Result<BatchReport, FaithError> {
        Ok(self.score_batch("deductive", batch, |position, instance| {
            self.deductive_item(position, instance)
        }))
    }

    /// Semantic consistency of explanation, evidence and verdict.
    /// References are not used.
    pub fn freeform_metrics(
        &self,
        batch: &[Instance],
        _references: Option<&[ReferenceStructure]>,
    ) -> Result<BatchReport, FaithError> {
        Ok(self.score_batch("freeform", batch, |position, instance| {
            self.freeform_item(position, instance)
        }))
    }

    fn validate_references<'r>(
        batch: &[Instance],
        references: Option<&'r [ReferenceStructure]>,
    ) -> Result<&'r [ReferenceStructure], ConfigError> {
        let references = references.ok_or(ConfigError::MissingReferences)?;
        if references.len() != batch.len() {
            return Err(ConfigError::ReferenceLengthMismatch {
                instances: batch.len(),
                references: references.len(),
            });
        }
        for (index, reference) in references.iter().enumerate() {
            reference
                .graph
                .validate()
                .map_err(|reason| ConfigError::MalformedReference { index, reason })?;
        }
        Ok(references)
    }

    fn score_batch<F>(&self, family: &str, batch: &[Instance], score: F) -> BatchReport
    where
        F: Fn(usize, &Instance) -> MetricResult + Sync + Send,
    {
        tracing::info!("Scoring {} instances with {} metrics", batch.len(), family);

        let items: Vec<MetricResult> = if self.config.parallel {
            batch
                .par_iter()
                .enumerate()
                .map(|(position, instance)| score(position, instance))
                .collect()
        } else {
            batch
                .iter()
                .enumerate()
                .map(|(position, instance)| score(position, instance))
                .collect()
        };

        let report = BatchReport::from_items(items);
        if let Some(stats) = report.score_stats() {
            tracing::info!(
                "{} metrics: {} scored, {} undefined, mean score {}",
                family,
                stats.count,
                stats.count_undefined,
                stats.mean.map_or("-".to_string(), |m| format!("{:.4}", m))
            );
        }
        report
    }

    fn verdict_statement(&self, instance: &Instance) -> String {
        self.config
            .verdict_templates
            .statement(instance.verdict(), instance.claim())
    }

    fn extract(&self, instance: &Instance, statement: &str) -> Result<ArgumentGraph, FaithError> {
        self.extractor
            .extract_for_verdict(instance.explanation(), statement, self.capabilities.similarity.as_ref())
    }

    fn argumentative_item(&self, position: usize, instance: &Instance, reference: &ReferenceStructure) -> MetricResult {
        let label = instance.label(position);
        let statement = self.verdict_statement(instance);

        let graph = match self.extract(instance, &statement) {
            Ok(graph) => graph,
            Err(FaithError::Extraction(e)) if self.config.fallback_on_extraction_failure => {
                tracing::warn!("Instance {}: extraction failed ({}), using freeform consistency", label, e);
                let mut result = self.freeform_item(position, instance);
                result.warn(format!("argument extraction failed ({}); scored with freeform consistency", e));
                return result;
            }
            Err(e) => {
                tracing::warn!("Instance {}: {}", label, e);
                return MetricResult::undefined(format!("argument extraction failed: {}", e));
            }
        };

        let scorer = ArgumentativeScorer::new(
            self.capabilities.similarity.as_ref(),
            self.config.alignment_similarity_threshold,
        );
        let mut result = match scorer.score(&graph, reference) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Instance {}: {}", label, e);
                return MetricResult::undefined(format!("similarity failed: {}", e));
            }
        };

        result.insert("circularity", circularity(&graph));
        result.insert("acceptability", dialectical_acceptability(&graph));

        // Only meaningful when the model reported a confidence
        let faithful = match (instance.confidence(), &result.detail) {
            (Some(confidence), Some(MetricDetail::Alignment(alignment))) => {
                let weighted = inherit_strengths(&graph, reference, alignment);
                Some(dialectical_faithfulness(&weighted, confidence, &self.config.dialectical))
            }
            _ => None,
        };
        if let Some(faithful) = faithful {
            result.insert("dialectical_faithfulness", if faithful { 1.0 } else { 0.0 });
        }

        tracing::debug!(
            "Instance {}: argumentative score {:?} ({} edges, {} warnings)",
            label,
            result.score,
            graph.edges.len(),
            result.warnings.len()
        );
        result
    }

    fn deductive_item(&self, position: usize, instance: &Instance) -> MetricResult {
        let label = instance.label(position);
        let statement = self.verdict_statement(instance);

        let graph = match self.extract(instance, &statement) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::warn!("Instance {}: {}", label, e);
                return MetricResult::undefined(format!("argument extraction failed: {}", e));
            }
        };
        let premises: Vec<String> = graph.premises().map(|p| p.text.clone()).collect();

        let checker = DeductiveChecker::new(self.capabilities.entailment.as_ref(), self.config.entailment_threshold);
        let outcome = match checker.check(instance.evidence(), &premises, &statement) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!("Instance {}: {}", label, e);
                return MetricResult::undefined(format!("entailment failed: {}", e));
            }
        };

        let verdict_entailed = if outcome.entailed { 1.0 } else { 0.0 };
        let mut result = match outcome.grounding_rate() {
            Some(grounding) => MetricResult::scored((grounding + verdict_entailed) / 2.0)
                .with_metric("premise_grounding", grounding),
            None => {
                let mut result = MetricResult::scored(verdict_entailed / 2.0).with_metric("premise_grounding", 0.0);
                result.warn("no premises extracted from the explanation");
                result
            }
        };
        result.insert("verdict_entailed", verdict_entailed);

        tracing::debug!(
            "Instance {}: {} premises, support {:?}, verdict entailed {}",
            label,
            premises.len(),
            outcome.premise_support,
            outcome.entailed
        );
        result.with_detail(MetricDetail::Deductive(outcome))
    }

    fn freeform_item(&self, position: usize, instance: &Instance) -> MetricResult {
        let scorer = FreeformScorer::new(
            self.capabilities.similarity.as_ref(),
            self.config.freeform_weight_evidence,
            self.config.freeform_weight_verdict,
        );
        let statement = self.verdict_statement(instance);
        match scorer.score(instance.evidence(), &statement, instance.explanation()) {
            Ok(result) => {
                tracing::debug!("Instance {}: freeform score {:?}", instance.label(position), result.score);
                result
            }
            Err(e) => {
                tracing::warn!("Instance {}: {}", instance.label(position), e);
                MetricResult::undefined(format!("similarity failed: {}", e))
            }
        }
    }
}

/// Copy reference strengths onto the aligned extracted propositions
fn inherit_strengths(graph: &ArgumentGraph, reference: &ReferenceStructure, alignment: &AlignmentSummary) -> ArgumentGraph {
    let mut weighted = graph.clone();
    for proposition in &mut weighted.propositions {
        proposition.strength = alignment
            .reference_for(&proposition.id)
            .and_then(|id| reference.graph.proposition(id))
            .and_then(|p| p.strength);
    }
    weighted
}

/// Argumentative faithfulness of a batch against its reference structures
pub fn argumentative_metrics(
    batch: &[Instance],
    references: Option<&[ReferenceStructure]>,
    config: &EvaluationConfig,
) -> Result<BatchReport, FaithError> {
    EvaluationPipeline::new(config.clone())?.argumentative_metrics(batch, references)
}

/// Deductive consistency of a batch
pub fn deductive_metrics(
    batch: &[Instance],
    references: Option<&[ReferenceStructure]>,
    config: &EvaluationConfig,
) -> Result<BatchReport, FaithError> {
    EvaluationPipeline::new(config.clone())?.deductive_metrics(batch, references)
}

/// Freeform consistency of a batch
pub fn freeform_metrics(
    batch: &[Instance],
    references: Option<&[ReferenceStructure]>,
    config: &EvaluationConfig,
) -> Result<BatchReport, FaithError> {
    EvaluationPipeline::new(config.clone())?.freeform_metrics(batch, references)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Relation;
    use crate::instance::Verdict;

    fn instance(explanation: &str) -> Instance {
        Instance::new(
            "Vaccine X causes Y",
            vec!["Study A found no causal link between X and Y".to_string()],
            Verdict::Refuted,
            explanation,
        )
    }

    fn reference() -> ReferenceStructure {
        ArgumentGraph::with_conclusion("c", "The claim is refuted")
            .premise("p1", "Study A found no causal link between X and Y", Relation::Supports)
            .with_strength("c", 0.9)
            .with_strength("p1", 0.8)
            .into()
    }

    fn pipeline() -> EvaluationPipeline {
        EvaluationPipeline::new(EvaluationConfig::default()).expect("default config is valid")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EvaluationConfig::default();
        config.metrics.entailment_threshold = 2.0;
        assert!(matches!(
            EvaluationPipeline::new(config),
            Err(FaithError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_references_required() {
        let batch = vec![instance("The claim is refuted.")];
        let err = pipeline().argumentative_metrics(&batch, None).unwrap_err();
        assert_eq!(err, FaithError::Config(ConfigError::MissingReferences));

        let err = pipeline().argumentative_metrics(&batch, Some(&[])).unwrap_err();
        assert!(matches!(
            err,
            FaithError::Config(ConfigError::ReferenceLengthMismatch { instances: 1, references: 0 })
        ));

        let malformed = vec![ReferenceStructure::default()];
        let err = pipeline().argumentative_metrics(&batch, Some(&malformed)).unwrap_err();
        assert!(matches!(err, FaithError::Config(ConfigError::MalformedReference { index: 0, .. })));
    }

    #[test]
    fn test_argumentative_supplements() {
        let batch = vec![instance(
            "Study A found no causal link between X and Y, so the claim is refuted.",
        )
        .with_confidence(0.95)];
        let report = pipeline()
            .argumentative_metrics(&batch, Some(&[reference()]))
            .expect("valid batch");

        let item = &report.items[0];
        assert_eq!(item.score, Some(1.0));
        assert_eq!(item.metric("circularity"), Some(0.0));
        assert_eq!(item.metric("acceptability"), Some(1.0));
        assert_eq!(item.metric("dialectical_faithfulness"), Some(1.0));
    }

    #[test]
    fn test_no_confidence_no_dialectical_faithfulness() {
        let batch = vec![instance("Study A found no causal link between X and Y, so the claim is refuted.")];
        let report = pipeline()
            .argumentative_metrics(&batch, Some(&[reference()]))
            .expect("valid batch");
        assert!(report.items[0].metric("dialectical_faithfulness").is_none());
    }

    #[test]
    fn test_extraction_failure_falls_back_to_freeform() {
        let batch = vec![instance("{\"x\": [1, 2, 3]}")];
        let report = pipeline()
            .argumentative_metrics(&batch, Some(&[reference()]))
            .expect("valid batch");
        let item = &report.items[0];
        assert!(item.is_defined());
        assert!(item.metric("verdict_alignment").is_some());
        assert!(item.warnings.iter().any(|w| w.contains("freeform")));

        let mut config = EvaluationConfig::default();
        config.metrics.fallback_on_extraction_failure = false;
        let strict = EvaluationPipeline::new(config).expect("valid");
        let report = strict.argumentative_metrics(&batch, Some(&[reference()])).expect("valid batch");
        assert!(!report.items[0].is_defined());
    }

    #[test]
    fn test_deductive_without_premises() {
        let batch = vec![instance("The claim is refuted.")];
        let report = pipeline().deductive_metrics(&batch, None).expect("valid batch");
        let item = &report.items[0];
        assert_eq!(item.score, Some(0.0));
        assert_eq!(item.metric("premise_grounding"), Some(0.0));
        assert_eq!(item.warnings.len(), 1);
        assert!(matches!(item.detail, Some(MetricDetail::Deductive(_))));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let batch: Vec<Instance> = [
            "Study A shows no link, so the claim is refuted.",
            "12345 67890",
            "The claim is refuted because vaccines are generally safe.",
        ]
        .iter()
        .map(|e| instance(e))
        .collect();

        let mut config = EvaluationConfig::default();
        config.metrics.parallel = false;
        let sequential = freeform_metrics(&batch, None, &config).expect("valid");
        let parallel = freeform_metrics(&batch, None, &EvaluationConfig::default()).expect("valid");
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.len(), 3);
    }
}
