// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Per-item metric results and batch aggregation
//!
//! Provides:
//! - `MetricResult`: score, named sub-metrics, warnings and optional detail
//! - `SummaryStats`: mean/median/stdev over the defined values of one metric
//! - `BatchReport`: per-item results in input order plus aggregates

use crate::argumentative::AlignmentSummary;
use crate::deductive::DeductiveResult;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate key of the overall score
pub const SCORE_KEY: &str = "score";

/// Family-specific detail attached to a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricDetail {
    Deductive(DeductiveResult),
    Alignment(AlignmentSummary),
}

/// Result of scoring one instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Overall score in [0, 1]; `None` when the metric is undefined for the item
    pub score: Option<f64>,
    /// Named sub-metrics
    pub breakdown: BTreeMap<String, f64>,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<MetricDetail>,
}

impl MetricResult {
    pub fn scored(score: f64) -> Self {
        Self {
            score: Some(score),
            ..Default::default()
        }
    }

    /// An undefined result carrying the reason as a warning
    pub fn undefined(warning: impl Into<String>) -> Self {
        Self {
            score: None,
            warnings: vec![warning.into()],
            ..Default::default()
        }
    }

    pub fn with_metric(mut self, name: &str, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_detail(mut self, detail: MetricDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        self.breakdown.insert(name.to_string(), value);
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn is_defined(&self) -> bool {
        self.score.is_some()
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.breakdown.get(name).copied()
    }
}

/// Summary statistics over one metric of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Population standard deviation
    pub stdev: Option<f64>,
    /// Number of values aggregated
    pub count: usize,
    /// Items without a value for this metric: undefined, or not reporting it.
    /// `count + count_undefined` is the batch size.
    pub count_undefined: usize,
}

impl SummaryStats {
    pub fn from_values(values: &[f64], count_undefined: usize) -> Self {
        if values.is_empty() {
            return Self {
                count_undefined,
                ..Default::default()
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Self {
            mean: Some(mean),
            median: Some(median),
            stdev: Some(variance.sqrt()),
            count: values.len(),
            count_undefined,
        }
    }
}

/// Per-item results in input order, plus aggregates keyed by metric name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub items: Vec<MetricResult>,
    pub aggregate: BTreeMap<String, SummaryStats>,
}

impl BatchReport {
    /// Aggregate the overall score and every sub-metric seen in the batch.
    /// Undefined items, and defined items lacking a sub-metric, are skipped
    /// and counted under that metric's `count_undefined`.
    pub fn from_items(items: Vec<MetricResult>) -> Self {
        let total = items.len();

        let scores: Vec<f64> = items.iter().filter_map(|item| item.score).collect();
        let mut values: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for item in items.iter().filter(|item| item.is_defined()) {
            for (name, value) in &item.breakdown {
                values.entry(name.as_str()).or_default().push(*value);
            }
        }

        let mut aggregate: BTreeMap<String, SummaryStats> = values
            .into_iter()
            .map(|(name, values)| (name.to_string(), SummaryStats::from_values(&values, total - values.len())))
            .collect();
        aggregate.insert(SCORE_KEY.to_string(), SummaryStats::from_values(&scores, total - scores.len()));

        Self { items, aggregate }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Aggregate of the overall score
    pub fn score_stats(&self) -> Option<&SummaryStats> {
        self.aggregate.get(SCORE_KEY)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize batch report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_stats() {
        let stats = SummaryStats::from_values(&[0.0, 0.5, 1.0, 0.5], 2);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.count_undefined, 2);
        assert!((stats.mean.unwrap() - 0.5).abs() < 1e-9);
        assert!((stats.median.unwrap() - 0.5).abs() < 1e-9);
        // Population deviation: sqrt(0.125)
        assert!((stats.stdev.unwrap() - 0.125f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_summary_stats_empty() {
        let stats = SummaryStats::from_values(&[], 3);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.stdev, None);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.count_undefined, 3);
    }

    #[test]
    fn test_undefined_is_not_zero() {
        let undefined = MetricResult::undefined("extraction failed");
        assert!(!undefined.is_defined());
        assert_eq!(undefined.warnings, vec!["extraction failed".to_string()]);
        assert!(MetricResult::scored(0.0).is_defined());
    }

    #[test]
    fn test_batch_aggregation_skips_undefined() {
        let items = vec![
            MetricResult::scored(1.0).with_metric("edge_recall", 1.0),
            MetricResult::undefined("capability failed"),
            MetricResult::scored(0.5).with_metric("edge_recall", 0.0),
        ];
        let report = BatchReport::from_items(items);

        assert_eq!(report.len(), 3);
        let score = report.score_stats().expect("score aggregate");
        assert_eq!(score.count, 2);
        assert_eq!(score.count_undefined, 1);
        assert!((score.mean.unwrap() - 0.75).abs() < 1e-9);

        let recall = &report.aggregate["edge_recall"];
        assert_eq!(recall.count, 2);
        assert_eq!(recall.count_undefined, 1);
        assert!((recall.median.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_partially_reported_metric_counts_absent_items() {
        let items = vec![
            MetricResult::scored(1.0).with_metric("dialectical_faithfulness", 1.0),
            MetricResult::scored(0.5),
            MetricResult::undefined("capability failed"),
        ];
        let report = BatchReport::from_items(items);

        let faithfulness = &report.aggregate["dialectical_faithfulness"];
        assert_eq!(faithfulness.count, 1);
        assert_eq!(faithfulness.count_undefined, 2);
        for stats in report.aggregate.values() {
            assert_eq!(stats.count + stats.count_undefined, report.len());
        }
    }

    #[test]
    fn test_empty_batch() {
        let report = BatchReport::from_items(Vec::new());
        assert!(report.is_empty());
        assert_eq!(report.score_stats().map(|s| s.count), Some(0));
    }

    #[test]
    fn test_report_json() {
        let detail = MetricDetail::Deductive(DeductiveResult {
            entailed: true,
            premise_support: vec![true],
        });
        let report = BatchReport::from_items(vec![MetricResult::scored(1.0).with_detail(detail)]);
        let json = report.to_json().expect("serializable");
        assert!(json.contains("\"kind\": \"deductive\""));
        let back: BatchReport = serde_json::from_str(&json).expect("round trip");
        assert_eq!(back, report);
    }
}
