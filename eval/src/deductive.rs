// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Deductive consistency: are the premises grounded in the evidence, and do
//! the grounded premises entail the verdict?
//!
//! Judgements are Boolean per pair. Premises the evidence does not entail are
//! left out of the conclusion check, so only faithful premises can justify
//! the verdict.

use crate::capability::Entailment;
use crate::error::CapabilityError;
use serde::{Deserialize, Serialize};

/// Outcome of a deductive check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductiveResult {
    /// Verdict entailed by the conjunction of evidence-entailed premises
    pub entailed: bool,
    /// Per premise, in input order: entailed by the evidence
    pub premise_support: Vec<bool>,
}

impl DeductiveResult {
    /// Fraction of grounded premises, `None` without premises
    pub fn grounding_rate(&self) -> Option<f64> {
        if self.premise_support.is_empty() {
            return None;
        }
        let grounded = self.premise_support.iter().filter(|s| **s).count();
        Some(grounded as f64 / self.premise_support.len() as f64)
    }
}

pub struct DeductiveChecker<'a> {
    entailment: &'a dyn Entailment,
    threshold: f64,
}

impl<'a> DeductiveChecker<'a> {
    pub fn new(entailment: &'a dyn Entailment, threshold: f64) -> Self {
        Self {
            entailment,
            threshold,
        }
    }

    fn entails(&self, premise: &str, hypothesis: &str) -> Result<bool, CapabilityError> {
        Ok(self.entailment.entailment(premise, hypothesis)? >= self.threshold)
    }

    pub fn check<S: AsRef<str>>(
        &self,
        evidence: &[S],
        premises: &[S],
        verdict: &str,
    ) -> Result<DeductiveResult, CapabilityError> {
        let evidence_text = evidence
            .iter()
            .map(|e| e.as_ref().trim())
            .filter(|e| !e.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut premise_support = Vec::with_capacity(premises.len());
        for premise in premises {
            let supported = !evidence_text.is_empty() && self.entails(&evidence_text, premise.as_ref())?;
            premise_support.push(supported);
        }

        let grounded: Vec<&str> = premises
            .iter()
            .zip(&premise_support)
            .filter(|(_, supported)| **supported)
            .map(|(p, _)| p.as_ref())
            .collect();

        let entailed = if grounded.is_empty() {
            false
        } else {
            self.entails(&grounded.join(" "), verdict)?
        };

        Ok(DeductiveResult {
            entailed,
            premise_support,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::LexicalNli;

    /// Entails exactly the listed (premise, hypothesis) pairs
    struct TableNli(Vec<(&'static str, &'static str)>);

    impl Entailment for TableNli {
        fn entailment(&self, premise: &str, hypothesis: &str) -> Result<f64, CapabilityError> {
            let hit = self.0.iter().any(|(p, h)| *p == premise && *h == hypothesis);
            Ok(if hit { 1.0 } else { 0.0 })
        }
    }

    struct BrokenNli;

    impl Entailment for BrokenNli {
        fn entailment(&self, _premise: &str, _hypothesis: &str) -> Result<f64, CapabilityError> {
            Err(CapabilityError::new("broken", "model unavailable"))
        }
    }

    #[test]
    fn test_no_premises_not_entailed() {
        let nli = LexicalNli::new();
        let checker = DeductiveChecker::new(&nli, 0.5);
        let result = checker
            .check::<&str>(&["Study A found no link"], &[], "The claim is refuted.")
            .expect("ok");
        assert!(!result.entailed);
        assert!(result.premise_support.is_empty());
        assert_eq!(result.grounding_rate(), None);
    }

    #[test]
    fn test_ungrounded_premises_excluded() {
        let nli = TableNli(vec![
            ("evidence", "grounded"),
            ("ungrounded", "verdict"),
            ("grounded", "verdict"),
        ]);
        let checker = DeductiveChecker::new(&nli, 0.5);

        let result = checker.check(&["evidence"], &["ungrounded"], "verdict").expect("ok");
        assert_eq!(result.premise_support, vec![false]);
        assert!(!result.entailed, "ungrounded premise must not justify the verdict");

        let result = checker
            .check(&["evidence"], &["grounded", "ungrounded"], "verdict")
            .expect("ok");
        assert_eq!(result.premise_support, vec![true, false]);
        assert!(result.entailed);
        assert_eq!(result.grounding_rate(), Some(0.5));
    }

    #[test]
    fn test_lexical_grounding() {
        let nli = LexicalNli::new();
        let checker = DeductiveChecker::new(&nli, 0.5);
        let result = checker
            .check(
                &["Study A found no causal link between X and Y"],
                &["Study A shows no link", "vaccines are generally safe"],
                "The claim that Vaccine X causes Y is refuted.",
            )
            .expect("ok");
        assert_eq!(result.premise_support, vec![true, false]);
    }

    #[test]
    fn test_empty_evidence_grounds_nothing() {
        let nli = LexicalNli::new();
        let checker = DeductiveChecker::new(&nli, 0.0);
        let result = checker.check(&[""], &["anything at all"], "verdict").expect("ok");
        assert_eq!(result.premise_support, vec![false]);
        assert!(!result.entailed);
    }

    #[test]
    fn test_capability_failure_propagates() {
        let checker = DeductiveChecker::new(&BrokenNli, 0.5);
        let err = checker.check(&["e"], &["p"], "v").unwrap_err();
        assert_eq!(err.provider, "broken");
    }
}
