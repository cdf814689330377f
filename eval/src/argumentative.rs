// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Argumentative faithfulness: agreement of an extracted argument graph with a
//! reference structure
//!
//! Propositions are aligned by semantic similarity (conclusion first, then
//! premises greedily one-to-one). Edges are compared under that alignment:
//! - `edge_precision`: matched extracted edges / extracted edges
//! - `edge_recall`: matched reference edges / reference edges
//! - `edge_label_accuracy`: support/attack agreement over matched edges
//! - `conclusion_alignment`: 1 if the conclusions align, else 0

use crate::capability::Similarity;
use crate::error::CapabilityError;
use crate::graph::{ArgumentGraph, ReferenceStructure};
use crate::metrics::{MetricDetail, MetricResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An extracted proposition aligned with a reference proposition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub extracted: String,
    pub reference: String,
    pub similarity: f64,
}

/// How the extracted graph was mapped onto the reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    pub conclusion: Option<AlignedPair>,
    pub premises: Vec<AlignedPair>,
    /// Extracted premise ids with no reference counterpart
    pub unaligned: Vec<String>,
    /// Reference premise ids no extracted premise covers
    pub uncovered: Vec<String>,
    pub matched_edges: usize,
}

impl AlignmentSummary {
    /// All aligned pairs, conclusion first
    pub fn pairs(&self) -> impl Iterator<Item = &AlignedPair> {
        self.conclusion.iter().chain(self.premises.iter())
    }

    /// Reference id aligned with an extracted proposition
    pub fn reference_for(&self, extracted: &str) -> Option<&str> {
        self.pairs()
            .find(|pair| pair.extracted == extracted)
            .map(|pair| pair.reference.as_str())
    }
}

pub struct ArgumentativeScorer<'a> {
    similarity: &'a dyn Similarity,
    threshold: f64,
}

impl<'a> ArgumentativeScorer<'a> {
    pub fn new(similarity: &'a dyn Similarity, threshold: f64) -> Self {
        Self {
            similarity,
            threshold,
        }
    }

    /// Map extracted propositions onto reference propositions
    pub fn align(
        &self,
        graph: &ArgumentGraph,
        reference: &ReferenceStructure,
    ) -> Result<AlignmentSummary, CapabilityError> {
        let mut summary = AlignmentSummary::default();

        if let (Some(ours), Some(theirs)) = (graph.conclusion(), reference.graph.conclusion()) {
            let sim = self.similarity.similarity(&ours.text, &theirs.text)?;
            if sim >= self.threshold {
                summary.conclusion = Some(AlignedPair {
                    extracted: ours.id.clone(),
                    reference: theirs.id.clone(),
                    similarity: sim,
                });
            }
        }

        let ours: Vec<_> = graph.premises().collect();
        let theirs: Vec<_> = reference.graph.premises().collect();

        let mut candidates = Vec::new();
        for (i, a) in ours.iter().enumerate() {
            for (j, b) in theirs.iter().enumerate() {
                let sim = self.similarity.similarity(&a.text, &b.text)?;
                if sim >= self.threshold {
                    candidates.push((i, j, sim));
                }
            }
        }
        candidates.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)).then(a.1.cmp(&b.1)));

        let mut ours_used = vec![false; ours.len()];
        let mut theirs_used = vec![false; theirs.len()];
        for (i, j, sim) in candidates {
            if ours_used[i] || theirs_used[j] {
                continue;
            }
            ours_used[i] = true;
            theirs_used[j] = true;
            summary.premises.push(AlignedPair {
                extracted: ours[i].id.clone(),
                reference: theirs[j].id.clone(),
                similarity: sim,
            });
        }

        summary.unaligned = ours
            .iter()
            .zip(&ours_used)
            .filter(|(_, used)| !**used)
            .map(|(p, _)| p.id.clone())
            .collect();
        summary.uncovered = theirs
            .iter()
            .zip(&theirs_used)
            .filter(|(_, used)| !**used)
            .map(|(p, _)| p.id.clone())
            .collect();

        Ok(summary)
    }

    pub fn score(&self, graph: &ArgumentGraph, reference: &ReferenceStructure) -> Result<MetricResult, CapabilityError> {
        let mut alignment = self.align(graph, reference)?;
        let mapping: HashMap<&str, &str> = alignment
            .pairs()
            .map(|pair| (pair.extracted.as_str(), pair.reference.as_str()))
            .collect();

        let reference_edges = &reference.graph.edges;
        let mut used = vec![false; reference_edges.len()];
        let mut matched = 0usize;
        let mut same_label = 0usize;

        for edge in &graph.edges {
            let (Some(source), Some(target)) = (mapping.get(edge.source.as_str()), mapping.get(edge.target.as_str()))
            else {
                continue;
            };
            let hit = reference_edges
                .iter()
                .enumerate()
                .find(|(k, r)| !used[*k] && r.source == *source && r.target == *target);
            if let Some((k, r)) = hit {
                used[k] = true;
                matched += 1;
                if r.relation == edge.relation {
                    same_label += 1;
                }
            }
        }
        alignment.matched_edges = matched;

        let both_edgeless = graph.edges.is_empty() && reference_edges.is_empty();
        let vacuous = if both_edgeless { 1.0 } else { 0.0 };
        let (precision, recall) = if graph.edges.is_empty() || reference_edges.is_empty() {
            (vacuous, vacuous)
        } else {
            (
                matched as f64 / graph.edges.len() as f64,
                matched as f64 / reference_edges.len() as f64,
            )
        };
        let label_accuracy = if matched > 0 {
            same_label as f64 / matched as f64
        } else {
            vacuous
        };
        let conclusion = if alignment.conclusion.is_some() { 1.0 } else { 0.0 };

        let score = if both_edgeless {
            1.0
        } else {
            (precision + recall + label_accuracy + conclusion) / 4.0
        };

        let mut result = MetricResult::scored(score)
            .with_metric("edge_precision", precision)
            .with_metric("edge_recall", recall)
            .with_metric("edge_label_accuracy", label_accuracy)
            .with_metric("conclusion_alignment", conclusion);

        if alignment.conclusion.is_none() {
            let text = graph.conclusion().map_or("", |c| c.text.as_str());
            result.warn(format!("conclusion '{}' does not align with the reference conclusion", text));
        }
        for id in &alignment.unaligned {
            if let Some(p) = graph.proposition(id) {
                result.warn(format!("unaligned premise '{}'", p.text));
            }
        }
        for id in &alignment.uncovered {
            if let Some(p) = reference.graph.proposition(id) {
                result.warn(format!("reference premise '{}' is not covered by the explanation", p.text));
            }
        }
        for orphan in graph.orphan_premises() {
            result.warn(format!("orphan premise '{}' has no relation", orphan.text));
        }

        Ok(result.with_detail(MetricDetail::Alignment(alignment)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::LexicalNli;
    use crate::graph::Relation;

    fn reference() -> ReferenceStructure {
        ArgumentGraph::with_conclusion("c", "The claim is refuted")
            .premise("p1", "Study A found no causal link between X and Y", Relation::Supports)
            .into()
    }

    #[test]
    fn test_identical_graphs_score_one() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let reference = reference();
        let result = scorer.score(&reference.graph, &reference).expect("ok");
        assert_eq!(result.score, Some(1.0));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unaligned_premise_lowers_recall() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let graph = ArgumentGraph::with_conclusion("u0", "The claim is refuted")
            .premise("u1", "vaccines are generally safe", Relation::Supports);

        let result = scorer.score(&graph, &reference()).expect("ok");
        assert!(result.metric("edge_recall").unwrap() < 1.0);
        assert_eq!(result.metric("conclusion_alignment"), Some(1.0));
        assert_eq!(result.score, Some(0.25));
        assert!(result.warnings.iter().any(|w| w.contains("unaligned premise")));
        assert!(result.warnings.iter().any(|w| w.contains("not covered")));
    }

    #[test]
    fn test_both_edgeless_scores_one() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let graph = ArgumentGraph::with_conclusion("u0", "The moon is made of cheese");
        let reference = ReferenceStructure::new(ArgumentGraph::with_conclusion("c", "The claim is refuted"));

        let result = scorer.score(&graph, &reference).expect("ok");
        assert_eq!(result.score, Some(1.0));
        assert_eq!(result.metric("edge_precision"), Some(1.0));
        assert_eq!(result.metric("conclusion_alignment"), Some(0.0));
        assert!(result.warnings.iter().any(|w| w.contains("does not align")));
    }

    #[test]
    fn test_one_side_edgeless() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let graph = ArgumentGraph::with_conclusion("u0", "The claim is refuted");

        let result = scorer.score(&graph, &reference()).expect("ok");
        assert_eq!(result.metric("edge_precision"), Some(0.0));
        assert_eq!(result.metric("edge_recall"), Some(0.0));
        assert_eq!(result.metric("edge_label_accuracy"), Some(0.0));
        assert_eq!(result.score, Some(0.25));
    }

    #[test]
    fn test_wrong_label_counts_against_accuracy() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let graph = ArgumentGraph::with_conclusion("u0", "The claim is refuted")
            .premise("u1", "Study A found no causal link between X and Y", Relation::Attacks);

        let result = scorer.score(&graph, &reference()).expect("ok");
        assert_eq!(result.metric("edge_precision"), Some(1.0));
        assert_eq!(result.metric("edge_label_accuracy"), Some(0.0));
        assert_eq!(result.score, Some(0.75));
    }

    #[test]
    fn test_greedy_alignment_is_one_to_one() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.5);
        let graph = ArgumentGraph::with_conclusion("u0", "The claim is refuted")
            .premise("u1", "Study A found no causal link", Relation::Supports)
            .premise("u2", "Study A found no causal link between X and Y", Relation::Supports);

        let alignment = scorer.align(&graph, &reference()).expect("ok");
        assert_eq!(alignment.premises.len(), 1);
        assert_eq!(alignment.reference_for("u2"), Some("p1"));
        assert_eq!(alignment.unaligned, vec!["u1".to_string()]);
        assert_eq!(alignment.reference_for("u0"), Some("c"));
    }

    #[test]
    fn test_cyclic_graph_is_scored() {
        let nli = LexicalNli::new();
        let scorer = ArgumentativeScorer::new(&nli, 0.7);
        let mut graph = reference().graph;
        graph.add_edge("c", "p1", Relation::Supports);

        let result = scorer.score(&graph, &reference()).expect("ok");
        assert_eq!(result.metric("edge_recall"), Some(1.0));
        assert_eq!(result.metric("edge_precision"), Some(0.5));
    }
}
