// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2024 Hyperpolymath

//! Dialectical properties of an argument graph
//!
//! - Circularity: how much of the framework lies on or leads into cycles
//! - Acceptability: whether attacks on the verdict's arguments are answered
//! - Dialectical faithfulness: whether argument strengths match the model's confidence

use crate::config::DialecticalConfig;
use crate::graph::{ArgumentGraph, Relation};

/// Arguments for the verdict: the conclusion and its direct supporters
fn verdict_arguments(graph: &ArgumentGraph) -> Vec<&str> {
    let Some(conclusion) = graph.conclusion() else {
        return Vec::new();
    };
    let mut args = vec![conclusion.id.as_str()];
    for supporter in graph.supporters_of(&conclusion.id) {
        if !args.contains(&supporter) {
            args.push(supporter);
        }
    }
    args
}

/// Fraction of DFS roots from which a cycle is reached (lower is better).
///
/// Attacks point attacker → attacked, supports are reversed
/// (supported → supporter) to form the combined framework. Nodes on a path
/// that closed a cycle stay flagged, so a root leading into one counts.
pub fn circularity(graph: &ArgumentGraph) -> f64 {
    let n = graph.propositions.len();
    if n == 0 {
        return 0.0;
    }

    let mut adjacency = vec![Vec::new(); n];
    for edge in &graph.edges {
        let (Some(source), Some(target)) = (graph.index_of(&edge.source), graph.index_of(&edge.target)) else {
            continue;
        };
        match edge.relation {
            Relation::Attacks => adjacency[source].push(target),
            Relation::Supports => adjacency[target].push(source),
        }
    }

    let mut visited = vec![false; n];
    let mut on_stack = vec![false; n];
    let mut cyclic_roots = 0usize;

    for root in 0..n {
        if visited[root] {
            continue;
        }
        if reaches_cycle(&adjacency, root, &mut visited, &mut on_stack) {
            cyclic_roots += 1;
        }
    }

    cyclic_roots as f64 / n as f64
}

/// Iterative DFS; stops at the first back edge found
fn reaches_cycle(adjacency: &[Vec<usize>], root: usize, visited: &mut [bool], on_stack: &mut [bool]) -> bool {
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];
    visited[root] = true;
    on_stack[root] = true;

    while let Some(&(node, next)) = stack.last() {
        if let Some(&child) = adjacency[node].get(next) {
            let top = stack.len() - 1;
            stack[top].1 += 1;
            if !visited[child] {
                visited[child] = true;
                on_stack[child] = true;
                stack.push((child, 0));
            } else if on_stack[child] {
                // Path stays flagged: later roots running into it count as cyclic too
                return true;
            }
        } else {
            on_stack[node] = false;
            stack.pop();
        }
    }
    false
}

/// Acceptability of the verdict's arguments in [0, 1].
///
/// `1.0` when none of them is attacked. Otherwise each argument scores the
/// fraction of its attackers that are themselves attacked (`1.0` if it has
/// none); the sum is normalised by the size of the whole framework.
pub fn dialectical_acceptability(graph: &ArgumentGraph) -> f64 {
    let args = verdict_arguments(graph);
    if args.is_empty() || args.iter().all(|a| graph.attackers_of(a).is_empty()) {
        return 1.0;
    }

    let total: f64 = args
        .iter()
        .map(|arg| {
            let attackers = graph.attackers_of(arg);
            if attackers.is_empty() {
                return 1.0;
            }
            let defended = attackers
                .iter()
                .filter(|attacker| !graph.attackers_of(attacker).is_empty())
                .count();
            defended as f64 / attackers.len() as f64
        })
        .sum();

    total / graph.propositions.len() as f64
}

/// Whether argument strengths are consistent with the model's confidence.
///
/// Missing strengths count as `0.0`.
pub fn dialectical_faithfulness(graph: &ArgumentGraph, confidence: f64, config: &DialecticalConfig) -> bool {
    let strength = |id: &str| graph.proposition(id).and_then(|p| p.strength).unwrap_or(0.0);

    for arg in verdict_arguments(graph) {
        let own = strength(arg);
        let attackers: Vec<f64> = graph.attackers_of(arg).into_iter().map(strength).collect();

        let violated = if confidence >= config.top_confidence {
            attackers.iter().any(|a| *a >= own)
        } else if confidence >= config.high_confidence {
            attackers.iter().any(|a| *a > own)
        } else {
            own > config.weak_strength && attackers.iter().any(|a| *a <= own)
        };

        if violated {
            tracing::debug!("Dialectical faithfulness violated at '{}' (confidence {:.2})", arg, confidence);
            return false;
        }
    }
    true
}
