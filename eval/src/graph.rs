// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Argument graphs: propositions joined by support/attack relations
//!
//! A graph is rooted at a single conclusion node. Cycles are allowed and every
//! traversal in this crate tolerates them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Role of a proposition in the argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Premise,
    Conclusion,
}

/// Edge label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relation {
    Supports,
    Attacks,
}

/// An atomic statement of the argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    pub id: String,
    pub text: String,
    pub role: Role,
    /// Dialectical strength (0.0 to 1.0), e.g. an attribution score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

/// `source` supports or attacks `target`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: Relation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentGraph {
    pub propositions: Vec<Proposition>,
    pub edges: Vec<Edge>,
}

impl ArgumentGraph {
    /// Graph holding only a conclusion
    pub fn with_conclusion(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            propositions: vec![Proposition {
                id: id.into(),
                text: text.into(),
                role: Role::Conclusion,
                strength: None,
            }],
            edges: Vec::new(),
        }
    }

    pub fn add_premise(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.propositions.push(Proposition {
            id: id.into(),
            text: text.into(),
            role: Role::Premise,
            strength: None,
        });
    }

    pub fn add_edge(&mut self, source: impl Into<String>, target: impl Into<String>, relation: Relation) {
        self.edges.push(Edge {
            source: source.into(),
            target: target.into(),
            relation,
        });
    }

    /// Builder-style premise with a support/attack edge to the conclusion
    pub fn premise(mut self, id: &str, text: &str, relation: Relation) -> Self {
        let conclusion = self.conclusion().map(|c| c.id.clone());
        self.add_premise(id, text);
        if let Some(target) = conclusion {
            self.add_edge(id, target, relation);
        }
        self
    }

    pub fn with_strength(mut self, id: &str, strength: f64) -> Self {
        if let Some(p) = self.propositions.iter_mut().find(|p| p.id == id) {
            p.strength = Some(strength);
        }
        self
    }

    /// The conclusion node (first one if the graph is malformed)
    pub fn conclusion(&self) -> Option<&Proposition> {
        self.propositions.iter().find(|p| p.role == Role::Conclusion)
    }

    pub fn premises(&self) -> impl Iterator<Item = &Proposition> {
        self.propositions.iter().filter(|p| p.role == Role::Premise)
    }

    pub fn proposition(&self, id: &str) -> Option<&Proposition> {
        self.propositions.iter().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.propositions.iter().position(|p| p.id == id)
    }

    pub fn conclusion_count(&self) -> usize {
        self.propositions.iter().filter(|p| p.role == Role::Conclusion).count()
    }

    /// Premises with no incident edge
    pub fn orphan_premises(&self) -> Vec<&Proposition> {
        let touched: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        self.premises().filter(|p| !touched.contains(p.id.as_str())).collect()
    }

    /// Ids of propositions attacking `id`
    pub fn attackers_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.relation == Relation::Attacks && e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// Ids of propositions supporting `id`
    pub fn supporters_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.relation == Relation::Supports && e.target == id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// Structural checks: one conclusion, unique ids, edges between known nodes
    pub fn validate(&self) -> Result<(), String> {
        match self.conclusion_count() {
            1 => {}
            n => return Err(format!("expected exactly one conclusion, found {}", n)),
        }
        let mut seen = HashSet::new();
        for p in &self.propositions {
            if !seen.insert(p.id.as_str()) {
                return Err(format!("duplicate proposition id '{}'", p.id));
            }
            if let Some(s) = p.strength {
                if !(0.0..=1.0).contains(&s) {
                    return Err(format!("strength {} of '{}' outside [0, 1]", s, p.id));
                }
            }
        }
        for e in &self.edges {
            for end in [&e.source, &e.target] {
                if !seen.contains(end.as_str()) {
                    return Err(format!("edge references unknown proposition '{}'", end));
                }
            }
        }
        Ok(())
    }
}

/// Ground-truth argument structure supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceStructure {
    pub graph: ArgumentGraph,
}

impl ReferenceStructure {
    pub fn new(graph: ArgumentGraph) -> Self {
        Self { graph }
    }
}

impl From<ArgumentGraph> for ReferenceStructure {
    fn from(graph: ArgumentGraph) -> Self {
        Self { graph }
    }
}
