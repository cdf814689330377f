// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Argument structure extraction from free-text explanations
//!
//! Explanations are cut into sentences, then into clauses at discourse
//! connectives ("because", "so", "however", ...). Each clause becomes a
//! proposition. One of them is chosen as the conclusion and the others are
//! linked to it (or to each other) with support/attack edges.
//!
//! The heuristics are approximate by nature; every cue list and threshold is
//! taken from [`ExtractionConfig`].

use crate::capability::{LexicalNli, Similarity};
use crate::config::ExtractionConfig;
use crate::error::{ConfigError, ExtractionError, FaithResult};
use crate::graph::{ArgumentGraph, Proposition, Relation, Role};
use crate::text;
use regex::Regex;
use std::collections::HashMap;

/// Discourse function of the connective that introduced a clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cue {
    Conclusion,
    Premise,
    Concessive,
    Adversative,
}

#[derive(Debug, Clone)]
struct Unit {
    text: String,
    cue: Option<Cue>,
    /// Sentence-initial "Because X, Y": the cue clause points at the next unit
    forward: bool,
}

fn normalise_cue(cue: &str) -> String {
    cue.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Turns explanation text into an [`ArgumentGraph`]
#[derive(Debug, Clone)]
pub struct ArgumentExtractor {
    config: ExtractionConfig,
    sentence_boundary: Regex,
    connective: Option<Regex>,
    cues: HashMap<String, Cue>,
}

impl ArgumentExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ConfigError> {
        let mut cues = HashMap::new();
        for (list, kind) in [
            (&config.conclusion_cues, Cue::Conclusion),
            (&config.premise_cues, Cue::Premise),
            (&config.concessive_cues, Cue::Concessive),
            (&config.adversative_cues, Cue::Adversative),
        ] {
            for cue in list {
                let key = normalise_cue(cue);
                if !key.is_empty() {
                    cues.entry(key).or_insert(kind);
                }
            }
        }

        // Longest phrases first so "even though" wins over "though"
        let mut phrases: Vec<&String> = cues.keys().collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = phrases
            .iter()
            .map(|p| p.split(' ').map(regex::escape).collect::<Vec<_>>().join(r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        let connective = if alternation.is_empty() {
            None
        } else {
            let pattern = format!(r"(?i)(^|[,;:]\s*|\s+)({})\b", alternation);
            Some(Regex::new(&pattern).map_err(|e| ConfigError::CuePattern(e.to_string()))?)
        };
        let sentence_boundary =
            Regex::new(r"[.!?]+(?:\s+|$)").map_err(|e| ConfigError::CuePattern(e.to_string()))?;

        Ok(Self {
            config: config.clone(),
            sentence_boundary,
            connective,
            cues,
        })
    }

    /// Extract using discourse cues only (lexical similarity for relation filtering)
    pub fn extract(&self, explanation: &str) -> FaithResult<ArgumentGraph> {
        self.build(explanation, None, &LexicalNli::new())
    }

    /// Extract with the conclusion chosen by similarity to the verdict statement
    pub fn extract_for_verdict(
        &self,
        explanation: &str,
        verdict_statement: &str,
        similarity: &dyn Similarity,
    ) -> FaithResult<ArgumentGraph> {
        self.build(explanation, Some(verdict_statement), similarity)
    }

    fn is_weak(&self, phrase: &str) -> bool {
        self.config.weak_cues.iter().any(|w| normalise_cue(w) == phrase)
    }

    fn check_shape(&self, explanation: &str) -> Result<(), ExtractionError> {
        if !text::has_word(explanation) {
            return Err(ExtractionError::NoWords);
        }
        let ratio = text::alpha_ratio(explanation);
        if ratio < self.config.min_alpha_ratio {
            return Err(ExtractionError::NotNaturalLanguage {
                ratio,
                min_ratio: self.config.min_alpha_ratio,
            });
        }
        Ok(())
    }

    fn split_clauses(&self, sentence: &str) -> Vec<Unit> {
        let mut raw: Vec<(&str, Option<Cue>)> = Vec::new();
        let mut start = 0;
        let mut cue = None;

        if let Some(connective) = &self.connective {
            for caps in connective.captures_iter(sentence) {
                let Some(whole) = caps.get(0) else { continue };
                let prefix = caps.get(1).map_or("", |m| m.as_str());
                let phrase = normalise_cue(caps.get(2).map_or("", |m| m.as_str()));
                let Some(kind) = self.cues.get(&phrase).copied() else { continue };
                if whole.start() > 0 && prefix.trim().is_empty() && self.is_weak(&phrase) {
                    continue;
                }
                raw.push((&sentence[start..whole.start()], cue));
                start = whole.end();
                cue = Some(kind);
            }
        }
        raw.push((&sentence[start..], cue));

        let mut units: Vec<Unit> = Vec::new();
        for (clause, cue) in raw {
            // "Because X, Y" / "Although X, Y"
            if units.is_empty() && matches!(cue, Some(Cue::Premise | Cue::Concessive)) {
                if let Some((head, tail)) = clause.split_once(',') {
                    let (head, tail) = (text::trim_clause(head), text::trim_clause(tail));
                    if !head.is_empty() && !tail.is_empty() {
                        units.push(Unit { text: head.to_string(), cue, forward: true });
                        units.push(Unit { text: tail.to_string(), cue: None, forward: false });
                        continue;
                    }
                }
            }
            let clause = text::trim_clause(clause);
            if !clause.is_empty() {
                units.push(Unit { text: clause.to_string(), cue, forward: false });
            }
        }
        units
    }

    fn segment(&self, explanation: &str) -> Vec<Unit> {
        self.sentence_boundary
            .split(explanation)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .flat_map(|sentence| self.split_clauses(sentence))
            .collect()
    }

    fn build(
        &self,
        explanation: &str,
        verdict_statement: Option<&str>,
        similarity: &dyn Similarity,
    ) -> FaithResult<ArgumentGraph> {
        let trimmed = explanation.trim();
        if trimmed.is_empty() {
            return Ok(ArgumentGraph::with_conclusion("u0", ""));
        }
        self.check_shape(trimmed)?;

        let units = self.segment(trimmed);
        if units.len() <= 1 {
            let only = units
                .first()
                .map(|u| u.text.clone())
                .unwrap_or_else(|| text::trim_clause(trimmed).to_string());
            return Ok(ArgumentGraph::with_conclusion("u0", only));
        }

        // Explicit links from connectives: (source, target)
        let n = units.len();
        let mut links = Vec::new();
        for (i, unit) in units.iter().enumerate() {
            match unit.cue {
                Some(Cue::Premise | Cue::Concessive) if unit.forward && i + 1 < n => links.push((i, i + 1)),
                Some(Cue::Premise | Cue::Concessive) if !unit.forward && i > 0 => links.push((i, i - 1)),
                Some(Cue::Conclusion) if i > 0 => links.push((i - 1, i)),
                _ => {}
            }
        }

        let attacking: Vec<bool> = (0..n)
            .map(|i| {
                units[i].cue == Some(Cue::Concessive)
                    || units.get(i + 1).is_some_and(|next| next.cue == Some(Cue::Adversative))
            })
            .collect();

        let conclusion = self.choose_conclusion(&units, &links, verdict_statement, similarity)?;

        let mut edges: Vec<(usize, usize, Relation)> = Vec::new();
        let mut has_outgoing = vec![false; n];
        for (source, target) in links {
            // The conclusion stays the root
            let (source, target) = if source == conclusion { (target, source) } else { (source, target) };
            if edges.iter().any(|(s, t, _)| *s == source && *t == target) {
                continue;
            }
            let relation = self.relation(&units, &attacking, source, target);
            edges.push((source, target, relation));
            has_outgoing[source] = true;
        }

        for i in 0..n {
            if i == conclusion || has_outgoing[i] {
                continue;
            }
            if self.config.min_relation_similarity > 0.0 {
                let sim = similarity.similarity(&units[i].text, &units[conclusion].text)?;
                if sim < self.config.min_relation_similarity {
                    tracing::debug!("Leaving premise '{}' unlinked (similarity {:.2})", units[i].text, sim);
                    continue;
                }
            }
            let relation = self.relation(&units, &attacking, i, conclusion);
            edges.push((i, conclusion, relation));
        }

        let id = |i: usize| format!("u{}", i);
        let propositions = units
            .iter()
            .enumerate()
            .map(|(i, unit)| Proposition {
                id: id(i),
                text: unit.text.clone(),
                role: if i == conclusion { Role::Conclusion } else { Role::Premise },
                strength: None,
            })
            .collect();

        let mut graph = ArgumentGraph {
            propositions,
            edges: Vec::new(),
        };
        for (source, target, relation) in edges {
            graph.add_edge(id(source), id(target), relation);
        }
        Ok(graph)
    }

    fn choose_conclusion(
        &self,
        units: &[Unit],
        links: &[(usize, usize)],
        verdict_statement: Option<&str>,
        similarity: &dyn Similarity,
    ) -> FaithResult<usize> {
        if let Some(statement) = verdict_statement {
            let mut best: Option<(usize, f64)> = None;
            for (i, unit) in units.iter().enumerate() {
                let sim = similarity.similarity(&unit.text, statement)?;
                if best.map_or(true, |(_, b)| sim >= b) {
                    best = Some((i, sim));
                }
            }
            if let Some((i, sim)) = best {
                if sim >= self.config.conclusion_similarity_threshold {
                    return Ok(i);
                }
            }
        }
        if let Some(i) = units.iter().rposition(|u| u.cue == Some(Cue::Conclusion)) {
            return Ok(i);
        }
        if let Some(&(_, target)) = links
            .iter()
            .filter(|(source, _)| units[*source].cue == Some(Cue::Premise))
            .max_by_key(|(_, target)| *target)
        {
            return Ok(target);
        }
        Ok(units.len() - 1)
    }

    fn relation(&self, units: &[Unit], attacking: &[bool], source: usize, target: usize) -> Relation {
        if attacking[source] {
            return Relation::Attacks;
        }
        let (a, b) = (&units[source].text, &units[target].text);
        let overlap = text::dice(&text::content_stems(a), &text::content_stems(b));
        if overlap >= self.config.polarity_overlap_threshold && text::has_negation(a) != text::has_negation(b) {
            Relation::Attacks
        } else {
            Relation::Supports
        }
    }
}
