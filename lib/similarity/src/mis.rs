//! Approximate maximum-weight independent sets
//!
//! Two solvers over a [`ConflictGraph`]:
//!
//! - **Greedy**: vertices by descending weight, each accepted unless it
//!   conflicts with one already accepted. No formal guarantee; reported with
//!   ratio 1 so the similarity interval collapses to a point.
//! - **Claw**: local search over claws. A claw is a centre vertex alone, or a
//!   centre with an independent set of at least two of its neighbours
//!   (talons). Starting from the empty set, a claw is swapped in whenever it
//!   strictly increases the square of the total selected weight, until no
//!   claw improves. The result is within `2 / claw_free` of the optimum.

use crate::graph::ConflictGraph;
use aujoin_core::{Error, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifierKind {
    #[default]
    Greedy,
    Claw,
}

impl FromStr for VerifierKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "greedy" => Ok(VerifierKind::Greedy),
            "claw" | "squareimp" => Ok(VerifierKind::Claw),
            _ => Err(Error::UnknownVerifier(s.to_string())),
        }
    }
}

impl fmt::Display for VerifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierKind::Greedy => f.write_str("greedy"),
            VerifierKind::Claw => f.write_str("claw"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MisSolution {
    /// Selected vertices, ascending
    pub selected: Vec<usize>,
    /// In (0, 1]
    pub approximation_ratio: f64,
}

impl MisSolution {
    pub fn weight(&self, graph: &ConflictGraph) -> f64 {
        self.selected.iter().map(|&v| graph.weight(v)).sum()
    }
}

/// Solve with the chosen strategy
pub fn solve(graph: &ConflictGraph, kind: VerifierKind) -> MisSolution {
    match kind {
        VerifierKind::Greedy => greedy(graph),
        VerifierKind::Claw => claw_local_search(graph),
    }
}

pub fn greedy(graph: &ConflictGraph) -> MisSolution {
    let mut order: Vec<usize> = (0..graph.len()).collect();
    order.sort_by(|&a, &b| graph.weight(b).total_cmp(&graph.weight(a)).then(a.cmp(&b)));

    let mut taken = vec![false; graph.len()];
    let mut selected = Vec::new();
    for v in order {
        if graph.neighbours[v].iter().any(|&u| taken[u]) {
            continue;
        }
        taken[v] = true;
        selected.push(v);
    }
    selected.sort_unstable();

    MisSolution {
        selected,
        approximation_ratio: 1.0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claw {
    pub centre: usize,
    /// Empty for a lone centre, otherwise at least two mutually independent neighbours, ascending
    pub talons: SmallVec<[usize; 4]>,
}

/// Every claw of the graph; each talon set is produced once
pub fn enumerate_claws(graph: &ConflictGraph) -> Vec<Claw> {
    let mut claws = Vec::new();
    let mut stack: Vec<(SmallVec<[usize; 4]>, Vec<usize>)> = Vec::new();

    for centre in 0..graph.len() {
        claws.push(Claw {
            centre,
            talons: SmallVec::new(),
        });

        let around = &graph.neighbours[centre];
        for (i, &first) in around.iter().enumerate() {
            let remaining: Vec<usize> = around[i + 1..]
                .iter()
                .copied()
                .filter(|&v| !graph.adjacent(first, v))
                .collect();
            let mut talons = SmallVec::new();
            talons.push(first);
            stack.push((talons, remaining));
        }

        while let Some((talons, remaining)) = stack.pop() {
            for (i, &next) in remaining.iter().enumerate() {
                let mut extended = talons.clone();
                extended.push(next);

                let further: Vec<usize> = remaining[i + 1..]
                    .iter()
                    .copied()
                    .filter(|&v| !graph.adjacent(next, v))
                    .collect();
                if !further.is_empty() {
                    stack.push((extended.clone(), further));
                }
                claws.push(Claw {
                    centre,
                    talons: extended,
                });
            }
        }
    }

    claws
}

pub fn claw_local_search(graph: &ConflictGraph) -> MisSolution {
    let claws = enumerate_claws(graph);
    let mut selected = vec![false; graph.len()];
    let mut weight = 0.0f64;

    loop {
        let mut improved = false;

        for claw in &claws {
            let incoming: &[usize] = if claw.talons.is_empty() {
                std::slice::from_ref(&claw.centre)
            } else {
                &claw.talons
            };

            let candidate = swap_in(graph, &selected, incoming);
            let candidate_weight = total_weight(graph, &candidate);

            if candidate_weight.powi(2) > weight.powi(2) {
                selected = candidate;
                weight = candidate_weight;
                improved = true;
            }
        }

        if !improved {
            break;
        }
    }

    MisSolution {
        selected: selected
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(v, _)| v)
            .collect(),
        approximation_ratio: 2.0 / graph.claw_free as f64,
    }
}

fn total_weight(graph: &ConflictGraph, selected: &[bool]) -> f64 {
    selected
        .iter()
        .enumerate()
        .filter(|(_, &s)| s)
        .map(|(v, _)| graph.weight(v))
        .sum()
}

/// Add `incoming` to the selection and drop every selected vertex adjacent to one of them
fn swap_in(graph: &ConflictGraph, selected: &[bool], incoming: &[usize]) -> Vec<bool> {
    let mut next = selected.to_vec();
    for &v in incoming {
        next[v] = true;
    }
    for &v in incoming {
        for &u in &graph.neighbours[v] {
            next[u] = false;
        }
    }
    next
}
