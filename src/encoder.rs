//! Encodes a directed path problem into oligonucleotides.
//!
//! Every vertex is a random oligo. An edge `a->b` joins the right half of
//! `a` to the left half of `b`, so a splint (the complement of a vertex)
//! can bridge two consecutive edges. The start vertex contributes its whole
//! sequence to its outgoing edges and the end vertex to its incoming ones,
//! which lets the primers bind at both ends of a complete path.

use crate::{
    error::{AdlemanError, Result},
    oligonucleotide::Oligonucleotide,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Which end of a path a primer amplifies from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimerOrientation {
    /// Same sense as the vertex; binds the splint strand.
    Forward,
    /// Antisense of the vertex; binds the edge strand.
    Reverse,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathProblem {
    pub vertices: Vec<String>,
    pub edges: Vec<(String, String)>,
    pub start: String,
    pub end: String,
    /// Fixed vertex sequences; vertices missing here get random ones.
    #[serde(default)]
    pub sequences: BTreeMap<String, String>,
}

impl PathProblem {
    pub fn new(vertices: &[&str], edges: &[(&str, &str)], start: &str, end: &str) -> Self {
        Self {
            vertices: vertices.iter().map(|v| v.to_string()).collect(),
            edges: edges
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect(),
            start: start.to_string(),
            end: end.to_string(),
            sequences: BTreeMap::new(),
        }
    }

    pub fn with_sequence(mut self, vertex: &str, sequence: &str) -> Self {
        self.sequences
            .insert(vertex.to_string(), sequence.to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(AdlemanError::Graph("no vertices".to_string()));
        }
        let mut known = HashSet::new();
        for vertex in &self.vertices {
            if vertex.trim().is_empty() {
                return Err(AdlemanError::Graph("empty vertex name".to_string()));
            }
            if !known.insert(vertex.as_str()) {
                return Err(AdlemanError::Graph(format!("duplicate vertex '{vertex}'")));
            }
        }
        for name in [&self.start, &self.end] {
            if !known.contains(name.as_str()) {
                return Err(AdlemanError::Graph(format!("unknown vertex '{name}'")));
            }
        }
        if self.start == self.end {
            return Err(AdlemanError::Graph(
                "start and end must be different vertices".to_string(),
            ));
        }
        let mut seen_edges = HashSet::new();
        for (a, b) in &self.edges {
            for name in [a, b] {
                if !known.contains(name.as_str()) {
                    return Err(AdlemanError::Graph(format!(
                        "edge {a}->{b} uses unknown vertex '{name}'"
                    )));
                }
            }
            if !seen_edges.insert((a, b)) {
                return Err(AdlemanError::Graph(format!("duplicate edge {a}->{b}")));
            }
        }
        for vertex in self.sequences.keys() {
            if !known.contains(vertex.as_str()) {
                return Err(AdlemanError::Graph(format!(
                    "sequence given for unknown vertex '{vertex}'"
                )));
            }
        }
        Ok(())
    }

    fn degrees(&self) -> HashMap<&str, (usize, usize)> {
        let mut ret: HashMap<&str, (usize, usize)> = HashMap::new();
        for (a, b) in &self.edges {
            ret.entry(a.as_str()).or_default().0 += 1;
            ret.entry(b.as_str()).or_default().1 += 1;
        }
        ret
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedVertex {
    pub name: String,
    pub oligo: Oligonucleotide,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedGraph {
    pub start: String,
    pub end: String,
    pub vertices: Vec<EncodedVertex>,
    pub edges: Vec<Oligonucleotide>,
    pub complements: Vec<Oligonucleotide>,
}

impl EncodedGraph {
    pub fn vertex(&self, name: &str) -> Option<&Oligonucleotide> {
        self.vertices
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.oligo)
    }

    pub fn primer(&self, vertex: &str, orientation: PrimerOrientation) -> Result<Oligonucleotide> {
        let oligo = self
            .vertex(vertex)
            .ok_or_else(|| AdlemanError::Graph(format!("unknown vertex '{vertex}'")))?;
        Ok(match orientation {
            PrimerOrientation::Forward => oligo.complement().primer(),
            PrimerOrientation::Reverse => oligo.primer(),
        })
    }

    pub fn forward_primer(&self) -> Result<Oligonucleotide> {
        self.primer(&self.start, PrimerOrientation::Forward)
    }

    pub fn reverse_primer(&self) -> Result<Oligonucleotide> {
        self.primer(&self.end, PrimerOrientation::Reverse)
    }

    /// Edges, then splints; the whole set is doubled `multiplication_factor`
    /// times.
    pub fn initial_members(&self, multiplication_factor: usize) -> Vec<Oligonucleotide> {
        let mut ret: Vec<Oligonucleotide> = self
            .edges
            .iter()
            .chain(self.complements.iter())
            .map(Oligonucleotide::copy)
            .collect();
        for _ in 0..multiplication_factor {
            let copies: Vec<Oligonucleotide> = ret.iter().map(Oligonucleotide::copy).collect();
            ret.extend(copies);
        }
        ret
    }
}

/// Encodes with random vertex oligos of `oligo_length` bases, except for
/// vertices with a fixed sequence in the problem.
pub fn encode<R: Rng + ?Sized>(
    problem: &PathProblem,
    oligo_length: usize,
    rng: &mut R,
) -> Result<EncodedGraph> {
    problem.validate()?;
    if oligo_length < 2 {
        return Err(AdlemanError::Parameter(format!(
            "oligo_length must be at least 2, got {oligo_length}"
        )));
    }
    let vertex_oligos = problem
        .vertices
        .iter()
        .map(|name| match problem.sequences.get(name) {
            Some(sequence) => {
                Oligonucleotide::from_sequence(sequence, sequence.len() / 2, name)
            }
            None => Oligonucleotide::random(&mut *rng, oligo_length, name),
        })
        .collect::<Result<Vec<_>>>()?;
    encode_with_vertices(problem, vertex_oligos)
}

/// Encodes with caller-supplied vertex oligos, one per vertex in problem
/// order.
pub fn encode_with_vertices(
    problem: &PathProblem,
    vertex_oligos: Vec<Oligonucleotide>,
) -> Result<EncodedGraph> {
    problem.validate()?;
    if vertex_oligos.len() != problem.vertices.len() {
        return Err(AdlemanError::Graph(format!(
            "{} vertex oligos for {} vertices",
            vertex_oligos.len(),
            problem.vertices.len()
        )));
    }
    let vertices: Vec<EncodedVertex> = problem
        .vertices
        .iter()
        .zip(vertex_oligos)
        .map(|(name, oligo)| EncodedVertex {
            name: name.clone(),
            oligo,
        })
        .collect();
    let by_name: HashMap<&str, &Oligonucleotide> = vertices
        .iter()
        .map(|v| (v.name.as_str(), &v.oligo))
        .collect();

    let mut edges = Vec::with_capacity(problem.edges.len());
    for (a, b) in &problem.edges {
        let (Some(from), Some(to)) = (by_name.get(a.as_str()), by_name.get(b.as_str())) else {
            return Err(AdlemanError::Graph(format!("edge {a}->{b} has no oligos")));
        };
        let left = if *a == problem.start {
            from.bases()
        } else {
            from.right_bases()
        };
        let right = if *b == problem.end {
            to.bases()
        } else {
            to.left_bases()
        };
        let bases = [left, right].concat();
        edges.push(Oligonucleotide::new(bases, left.len(), &format!("{a}->{b}"))?);
    }

    let degrees = problem.degrees();
    let mut complements = vec![];
    for vertex in &vertices {
        let (out_degree, in_degree) = degrees
            .get(vertex.name.as_str())
            .copied()
            .unwrap_or_default();
        let splint = vertex.oligo.complement();
        complements.extend((0..out_degree.max(in_degree)).map(|_| splint.copy()));
    }
    debug!(
        vertices = vertices.len(),
        edges = edges.len(),
        splints = complements.len(),
        "encoded path problem"
    );

    Ok(EncodedGraph {
        start: problem.start.clone(),
        end: problem.end.clone(),
        vertices,
        edges,
        complements,
    })
}
