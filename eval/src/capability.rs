// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Pluggable text capabilities: entailment and semantic similarity
//!
//! The engine never loads a model itself. Providers are passed in through
//! [`Capabilities`] and shared read-only between workers, so they must be
//! `Send + Sync`.
//!
//! [`LexicalNli`] is a deterministic provider based on content-word overlap.
//! It is monotone in the premise: adding premise text never lowers an
//! entailment score.

use crate::error::CapabilityError;
use crate::text;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Judges whether `premise` entails `hypothesis`; scores lie in [0, 1]
pub trait Entailment: Send + Sync {
    fn entailment(&self, premise: &str, hypothesis: &str) -> Result<f64, CapabilityError>;

    fn name(&self) -> &str {
        "entailment"
    }
}

/// Symmetric semantic similarity in [0, 1]
pub trait Similarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, CapabilityError>;

    fn name(&self) -> &str {
        "similarity"
    }
}

/// The two providers the engine depends on
#[derive(Clone)]
pub struct Capabilities {
    pub entailment: Arc<dyn Entailment>,
    pub similarity: Arc<dyn Similarity>,
}

impl Capabilities {
    pub fn new(entailment: Arc<dyn Entailment>, similarity: Arc<dyn Similarity>) -> Self {
        Self {
            entailment,
            similarity,
        }
    }

    /// Both capabilities served by one provider
    pub fn from_provider<P>(provider: Arc<P>) -> Self
    where
        P: Entailment + Similarity + 'static,
    {
        Self {
            entailment: provider.clone(),
            similarity: provider,
        }
    }

    /// The process-wide lexical provider
    pub fn lexical() -> Self {
        Self::from_provider(shared_lexical())
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("entailment", &self.entailment.name())
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

/// Overlap-based entailment and similarity
#[derive(Debug, Clone, Default)]
pub struct LexicalNli;

impl LexicalNli {
    pub fn new() -> Self {
        Self
    }
}

impl Entailment for LexicalNli {
    /// Share of hypothesis content words found in the premise. A negated
    /// hypothesis additionally needs a negation somewhere in the premise.
    fn entailment(&self, premise: &str, hypothesis: &str) -> Result<f64, CapabilityError> {
        let hyp = text::content_stems(hypothesis);
        if hyp.is_empty() {
            return Ok(0.0);
        }
        if text::has_negation(hypothesis) && !text::has_negation(premise) {
            return Ok(0.0);
        }
        let prem = text::content_stems(premise);
        let covered = hyp.iter().filter(|w| prem.contains(*w)).count();
        Ok(covered as f64 / hyp.len() as f64)
    }

    fn name(&self) -> &str {
        "lexical-nli"
    }
}

impl Similarity for LexicalNli {
    fn similarity(&self, a: &str, b: &str) -> Result<f64, CapabilityError> {
        Ok(text::dice(&text::content_stems(a), &text::content_stems(b)))
    }

    fn name(&self) -> &str {
        "lexical-dice"
    }
}

static SHARED_LEXICAL: RwLock<Option<Arc<LexicalNli>>> = RwLock::new(None);

/// Shared lexical provider, created on first use
pub fn shared_lexical() -> Arc<LexicalNli> {
    if let Some(provider) = SHARED_LEXICAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return provider.clone();
    }
    let mut slot = SHARED_LEXICAL.write().unwrap_or_else(PoisonError::into_inner);
    slot.get_or_insert_with(|| {
        tracing::debug!("Initialising shared lexical provider");
        Arc::new(LexicalNli::new())
    })
    .clone()
}

/// Drop the shared provider. Handles already given out stay valid; the next
/// call to [`shared_lexical`] creates a fresh one.
pub fn release_shared() -> bool {
    let released = SHARED_LEXICAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
        .is_some();
    if released {
        tracing::debug!("Released shared lexical provider");
    }
    released
}
