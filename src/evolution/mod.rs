//! Cultural genetic algorithm over chromosomes of knight-move indices.

pub mod belief;
pub mod crossover;
pub mod decoder;
pub mod engine;
pub mod fitness;
pub mod initialization;
pub mod local_search;
pub mod mutation;
pub mod selection;

pub use belief::BeliefSpace;
pub use decoder::{AcceptRule, Decoder};
pub use engine::{
    EvolutionEngine, EvolutionProfile, EvolutionReport, EvolutionSolver, GenerationRecord,
    OperatorCounts,
};
pub use fitness::{evaluate, fitness, FitnessReport};
