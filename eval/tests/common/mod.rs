// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Shared fixtures for the integration tests
#![allow(dead_code)]

use faithfulness_eval::{
    ArgumentGraph, CapabilityError, Entailment, Instance, LexicalNli, ReferenceStructure, Relation, Similarity,
    Verdict,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

/// Text containing this marker makes [`FailingNli`] error out
pub const FAIL_MARKER: &str = "zzfailzz";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// Lexical provider plus scripted entailments for pairs a word-overlap model cannot judge
pub struct ScriptedNli {
    lexical: LexicalNli,
    /// (premise fragment, hypothesis fragment) pairs judged as entailed
    entailed: Vec<(&'static str, &'static str)>,
}

impl ScriptedNli {
    pub fn new(entailed: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            lexical: LexicalNli::new(),
            entailed,
        }
    }
}

impl Entailment for ScriptedNli {
    fn entailment(&self, premise: &str, hypothesis: &str) -> Result<f64, CapabilityError> {
        if self
            .entailed
            .iter()
            .any(|(p, h)| premise.contains(p) && hypothesis.contains(h))
        {
            return Ok(1.0);
        }
        self.lexical.entailment(premise, hypothesis)
    }

    fn name(&self) -> &str {
        "scripted-nli"
    }
}

impl Similarity for ScriptedNli {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, CapabilityError> {
        self.lexical.similarity(a, b)
    }
}

/// Lexical provider that fails on any text containing [`FAIL_MARKER`]
pub struct FailingNli(LexicalNli);

impl FailingNli {
    pub fn new() -> Self {
        Self(LexicalNli::new())
    }

    fn guard(&self, a: &str, b: &str) -> Result<(), CapabilityError> {
        if a.contains(FAIL_MARKER) || b.contains(FAIL_MARKER) {
            return Err(CapabilityError::new("failing-nli", "marker in input"));
        }
        Ok(())
    }
}

impl Entailment for FailingNli {
    fn entailment(&self, premise: &str, hypothesis: &str) -> Result<f64, CapabilityError> {
        self.guard(premise, hypothesis)?;
        self.0.entailment(premise, hypothesis)
    }
}

impl Similarity for FailingNli {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, CapabilityError> {
        self.guard(a, b)?;
        self.0.similarity(a, b)
    }
}

pub const CLAIM: &str = "Vaccine X causes Y";
pub const EVIDENCE: &str = "Study A found no causal link between X and Y";

pub fn refuted(explanation: &str) -> Instance {
    Instance::new(CLAIM, vec![EVIDENCE.to_string()], Verdict::Refuted, explanation)
}

pub fn refuted_reference() -> ReferenceStructure {
    ArgumentGraph::with_conclusion("c", "The claim is refuted")
        .premise("p1", EVIDENCE, Relation::Supports)
        .into()
}

const WORDS: &[&str] = &[
    "study", "vaccine", "link", "claim", "evidence", "trial", "report", "shows", "found", "no", "not",
    "causal", "data", "refuted", "supported", "experts", "agree", "risk", "safe", "mortality",
];

const CONNECTIVES: &[&str] = &[
    "because", "so", "therefore", "although", "however", "but", "since", "thus", "given that", "while",
];

const PUNCTUATION: &[&str] = &[",", ".", ";", "!", "?", ":"];

/// Seeded pseudo-explanations mixing words, connectives and punctuation
pub fn synthetic_explanations(count: usize, seed: u64) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(1..30);
            let mut out = String::new();
            for _ in 0..len {
                let roll: f64 = rng.gen();
                let token = if roll < 0.7 {
                    WORDS[rng.gen_range(0..WORDS.len())]
                } else if roll < 0.85 {
                    CONNECTIVES[rng.gen_range(0..CONNECTIVES.len())]
                } else {
                    PUNCTUATION[rng.gen_range(0..PUNCTUATION.len())]
                };
                if !out.is_empty() && !PUNCTUATION.contains(&token) {
                    out.push(' ');
                }
                out.push_str(token);
            }
            out
        })
        .collect()
}

/// Seeded short sentence over a small vocabulary, so overlaps are frequent
pub fn synthetic_sentence(rng: &mut ChaCha8Rng, words: usize) -> String {
    (0..words)
        .map(|_| WORDS[rng.gen_range(0..WORDS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}
