use crate::{
    encoder::{self, EncodedGraph, PathProblem, PrimerOrientation},
    error::AdlemanError,
    gel::Gel,
    oligonucleotide::OligoId,
    pool::Pool,
    render,
};
use adleman_protocol::{GelReport, PROTOCOL_VERSION};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};
use tracing::info;

pub type OpId = String;
pub type RunId = String;

const MAX_MULTIPLICATION_FACTOR: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParameters {
    pub oligo_length: usize,
    pub primer_copies: usize,
    pub multiplication_factor: usize,
    pub anneal_passes: usize,
    pub pcr_cycles: usize,
    pub seed: Option<u64>,
}

impl Default for SolverParameters {
    fn default() -> Self {
        Self {
            oligo_length: 10,
            primer_copies: 50,
            multiplication_factor: 0,
            anneal_passes: 1,
            pcr_cycles: 1,
            seed: None,
        }
    }
}

impl SolverParameters {
    pub fn load_from_path(path: &str) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError {
            code: ErrorCode::Io,
            message: format!("Could not read config file '{path}': {e}"),
        })?;
        let ret: Self = serde_json::from_str(&text).map_err(|e| EngineError {
            code: ErrorCode::InvalidInput,
            message: format!("Could not parse config JSON '{path}': {e}"),
        })?;
        ret.validate().map_err(|e| EngineError {
            code: e.code,
            message: format!("Invalid config '{path}': {}", e.message),
        })?;
        Ok(ret)
    }

    /// Limits shared by config files, saved states and `SetParameter`.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |message: String| {
            Err(EngineError {
                code: ErrorCode::InvalidInput,
                message,
            })
        };
        if self.oligo_length < 2 {
            return invalid(format!("oligo_length must be >= 2, got {}", self.oligo_length));
        }
        if self.multiplication_factor > MAX_MULTIPLICATION_FACTOR {
            return invalid(format!(
                "multiplication_factor must be <= {MAX_MULTIPLICATION_FACTOR}, got {}",
                self.multiplication_factor
            ));
        }
        for (name, value) in [
            ("primer_copies", self.primer_copies),
            ("anneal_passes", self.anneal_passes),
            ("pcr_cycles", self.pcr_cycles),
        ] {
            if value == 0 {
                return invalid(format!("{name} must be positive"));
            }
        }
        Ok(())
    }

    fn integer(name: &str, value: &serde_json::Value) -> Result<usize, EngineError> {
        value
            .as_u64()
            .map(|raw| raw as usize)
            .ok_or_else(|| EngineError {
                code: ErrorCode::InvalidInput,
                message: format!("SetParameter {name} requires a non-negative integer"),
            })
    }

    /// Applies one named parameter and returns the value as stored. A value
    /// outside the limits of [`Self::validate`] leaves `self` unchanged.
    pub fn set(&mut self, name: &str, value: &serde_json::Value) -> Result<String, EngineError> {
        let mut next = self.clone();
        match name {
            "oligo_length" => next.oligo_length = Self::integer(name, value)?,
            "primer_copies" => next.primer_copies = Self::integer(name, value)?,
            "multiplication_factor" => next.multiplication_factor = Self::integer(name, value)?,
            "anneal_passes" => next.anneal_passes = Self::integer(name, value)?,
            "pcr_cycles" => next.pcr_cycles = Self::integer(name, value)?,
            "seed" => {
                next.seed = match value {
                    serde_json::Value::Null => None,
                    other => Some(other.as_u64().ok_or_else(|| EngineError {
                        code: ErrorCode::InvalidInput,
                        message: "SetParameter seed requires an integer or null".to_string(),
                    })?),
                };
            }
            _ => {
                return Err(EngineError {
                    code: ErrorCode::Unsupported,
                    message: format!("Unknown parameter '{name}'"),
                });
            }
        }
        next.validate()?;
        *self = next;
        Ok(match name {
            "seed" => format!("{:?}", self.seed),
            _ => value.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperimentState {
    #[serde(default)]
    pub problem: Option<PathProblem>,
    #[serde(default)]
    pub encoded: Option<EncodedGraph>,
    #[serde(default)]
    pub pool: Pool,
    #[serde(default)]
    pub gel: Option<GelReport>,
    #[serde(default)]
    pub parameters: SolverParameters,
}

impl ExperimentState {
    pub fn load_from_path(path: &str) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError {
            code: ErrorCode::Io,
            message: format!("Could not read state file '{path}': {e}"),
        })?;
        let state: Self = serde_json::from_str(&text).map_err(|e| EngineError {
            code: ErrorCode::InvalidInput,
            message: format!("Could not parse state JSON '{path}': {e}"),
        })?;
        state.parameters.validate().map_err(|e| EngineError {
            code: e.code,
            message: format!("Invalid parameters in state '{path}': {}", e.message),
        })?;
        state.pool.check_invariants().map_err(|e| EngineError {
            code: ErrorCode::InvalidInput,
            message: format!("Inconsistent pool in state '{path}': {e}"),
        })?;
        Ok(state)
    }

    pub fn save_to_path(&self, path: &str) -> Result<(), EngineError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| EngineError {
            code: ErrorCode::Internal,
            message: format!("Could not serialize state: {e}"),
        })?;
        std::fs::write(path, text).map_err(|e| EngineError {
            code: ErrorCode::Io,
            message: format!("Could not write state file '{path}': {e}"),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Encode {
        problem: PathProblem,
    },
    Anneal {
        passes: Option<usize>,
    },
    Denature,
    AddPrimers {
        vertex: String,
        orientation: PrimerOrientation,
        copies: Option<usize>,
    },
    AnnealPrimers,
    Pcr {
        cycles: Option<usize>,
    },
    RunGel {
        size: Option<usize>,
    },
    SetParameter {
        name: String,
        value: serde_json::Value,
    },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Encode { .. } => "Encode",
            Operation::Anneal { .. } => "Anneal",
            Operation::Denature => "Denature",
            Operation::AddPrimers { .. } => "AddPrimers",
            Operation::AnnealPrimers => "AnnealPrimers",
            Operation::Pcr { .. } => "Pcr",
            Operation::RunGel { .. } => "RunGel",
            Operation::SetParameter { .. } => "SetParameter",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub created_oligo_ids: Vec<usize>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    Unsupported,
    Io,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for EngineError {}

impl From<AdlemanError> for EngineError {
    fn from(e: AdlemanError) -> Self {
        let code = match &e {
            AdlemanError::UnknownOligo(_) => ErrorCode::NotFound,
            AdlemanError::Invariant(_) => ErrorCode::Internal,
            AdlemanError::Io(_) => ErrorCode::Io,
            _ => ErrorCode::InvalidInput,
        };
        EngineError {
            code,
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_operations: Vec<String>,
    pub supported_parameters: Vec<String>,
    pub deterministic_operation_log: bool,
}

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &ExperimentState;
}

#[derive(Debug, Clone, Default)]
pub struct DnaEngine {
    state: ExperimentState,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl DnaEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: ExperimentState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &ExperimentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ExperimentState {
        &mut self.state
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: PROTOCOL_VERSION.to_string(),
            supported_operations: vec![
                "Encode".to_string(),
                "Anneal".to_string(),
                "Denature".to_string(),
                "AddPrimers".to_string(),
                "AnnealPrimers".to_string(),
                "Pcr".to_string(),
                "RunGel".to_string(),
                "SetParameter".to_string(),
            ],
            supported_parameters: vec![
                "oligo_length".to_string(),
                "primer_copies".to_string(),
                "multiplication_factor".to_string(),
                "anneal_passes".to_string(),
                "pcr_cycles".to_string(),
                "seed".to_string(),
            ],
            deterministic_operation_log: true,
        }
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn encoded(&self) -> Result<&EncodedGraph, EngineError> {
        self.state.encoded.as_ref().ok_or_else(|| EngineError {
            code: ErrorCode::InvalidInput,
            message: "No path problem has been encoded yet".to_string(),
        })
    }

    fn check_pool(&self) -> Result<(), EngineError> {
        self.state.pool.check_invariants().map_err(EngineError::from)
    }

    fn ids(ids: &[OligoId]) -> Vec<usize> {
        ids.iter().map(|id| id.index()).collect()
    }

    /// The standard protocol: encode, assemble paths, melt, prime both ends,
    /// amplify, then keep the duplexes that visit every vertex.
    pub fn solve_workflow(problem: PathProblem, parameters: &SolverParameters) -> Workflow {
        let (start, end) = (problem.start.clone(), problem.end.clone());
        Workflow {
            run_id: "solve".to_string(),
            ops: vec![
                Operation::Encode { problem },
                Operation::Anneal {
                    passes: Some(parameters.anneal_passes),
                },
                Operation::Denature,
                Operation::AddPrimers {
                    vertex: start,
                    orientation: PrimerOrientation::Forward,
                    copies: Some(parameters.primer_copies),
                },
                Operation::AddPrimers {
                    vertex: end,
                    orientation: PrimerOrientation::Reverse,
                    copies: Some(parameters.primer_copies),
                },
                Operation::AnnealPrimers,
                Operation::Pcr {
                    cycles: Some(parameters.pcr_cycles),
                },
                Operation::RunGel { size: None },
            ],
        }
    }

    pub fn solve(&mut self, problem: PathProblem) -> Result<GelReport, EngineError> {
        let workflow = Self::solve_workflow(problem, &self.state.parameters);
        self.apply_workflow(workflow)?;
        self.state.gel.clone().ok_or_else(|| EngineError {
            code: ErrorCode::Internal,
            message: "Solve finished without a gel report".to_string(),
        })
    }

    fn apply_internal(&mut self, op: Operation, run_id: &str) -> Result<OpResult, EngineError> {
        let op_id = self.next_op_id();
        let op_name = op.name();
        let mut result = OpResult {
            op_id,
            created_oligo_ids: vec![],
            warnings: vec![],
            messages: vec![],
        };

        match op {
            Operation::Encode { problem } => {
                let parameters = &self.state.parameters;
                let mut rng = match parameters.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                let encoded = encoder::encode(&problem, parameters.oligo_length, &mut rng)?;
                let pool = Pool::new(encoded.initial_members(parameters.multiplication_factor));
                result.created_oligo_ids = Self::ids(&pool.ids());
                result.messages.push(format!(
                    "Encoded {} vertices and {} edges into {} oligonucleotides",
                    problem.vertices.len(),
                    problem.edges.len(),
                    pool.len()
                ));
                if problem.edges.is_empty() {
                    result
                        .warnings
                        .push("Graph has no edges; no path can form".to_string());
                }
                self.state.pool = pool;
                self.state.encoded = Some(encoded);
                self.state.problem = Some(problem);
                self.state.gel = None;
            }
            Operation::Anneal { passes } => {
                let passes = passes.unwrap_or(self.state.parameters.anneal_passes);
                let binds: usize = (0..passes).map(|_| self.state.pool.annealing()).sum();
                self.check_pool()?;
                result
                    .messages
                    .push(format!("Annealing ({passes} pass(es)) made {binds} bind(s)"));
            }
            Operation::Denature => {
                self.state.pool.denaturing();
                result
                    .messages
                    .push(format!("Denatured {} oligonucleotides", self.state.pool.len()));
            }
            Operation::AddPrimers {
                vertex,
                orientation,
                copies,
            } => {
                let copies = copies.unwrap_or(self.state.parameters.primer_copies);
                let primer = self.encoded()?.primer(&vertex, orientation)?;
                let ids = self
                    .state
                    .pool
                    .add_oligonucleotides((0..copies).map(|_| primer.copy()));
                if ids.is_empty() {
                    result
                        .warnings
                        .push(format!("No primers added for vertex '{vertex}'"));
                }
                result.created_oligo_ids = Self::ids(&ids);
                result.messages.push(format!(
                    "Added {copies} {orientation:?} primer(s) '{}' for vertex '{vertex}'",
                    primer.label()
                ));
            }
            Operation::AnnealPrimers => {
                let binds = self.state.pool.annealing_primers();
                self.check_pool()?;
                result
                    .messages
                    .push(format!("Primer annealing made {binds} bind(s)"));
            }
            Operation::Pcr { cycles } => {
                let cycles = cycles.unwrap_or(self.state.parameters.pcr_cycles);
                if cycles == 0 {
                    return Err(EngineError {
                        code: ErrorCode::InvalidInput,
                        message: "Pcr requires at least one cycle".to_string(),
                    });
                }
                let pool = &mut self.state.pool;
                let mut created = pool.polymerase_chain_reaction();
                for _ in 1..cycles {
                    pool.denaturing();
                    pool.annealing_primers();
                    created.extend(pool.polymerase_chain_reaction());
                }
                self.check_pool()?;
                if created.is_empty() {
                    result
                        .warnings
                        .push("No primer was bound; nothing was synthesized".to_string());
                }
                result.messages.push(format!(
                    "PCR ({cycles} cycle(s)) synthesized {} segment(s)",
                    created.len()
                ));
                result.created_oligo_ids = Self::ids(&created);
            }
            Operation::RunGel { size } => {
                let size = match size {
                    Some(size) => size,
                    None => self.encoded()?.vertices.len(),
                };
                let pool = &self.state.pool;
                let mut gel = Gel::new(pool.get_dna_strands());
                gel.run(pool);
                let report = render::gel_report(pool, &gel, size);
                result.messages.push(format!(
                    "Gel: {} duplex(es), {} of size {size}",
                    report.duplex_count(),
                    report.selected.len()
                ));
                if report.selected.is_empty() {
                    result
                        .warnings
                        .push(format!("No duplex of size {size} found"));
                }
                self.state.gel = Some(report);
            }
            Operation::SetParameter { name, value } => {
                let stored = self.state.parameters.set(&name, &value)?;
                result
                    .messages
                    .push(format!("Set parameter '{name}' to {stored}"));
            }
        }

        info!(
            run_id,
            op = op_name,
            op_id = %result.op_id,
            created = result.created_oligo_ids.len(),
            warnings = result.warnings.len(),
            "applied operation"
        );
        Ok(result)
    }
}

impl Engine for DnaEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(op.clone(), &run_id)?;
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone(), &wf.run_id)?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &ExperimentState {
        &self.state
    }
}
