//! The generational loop shared by every cultural-algorithm level.
//!
//! A level is an [`EvolutionProfile`]: which decoder rule it uses, whether the
//! belief space may steer decoding and variation, and which of the optional
//! phases (adaptive mutation, local search, diversity injection) run.

use super::belief::{rank_descending, BeliefSpace, EliteRecord};
use super::crossover::{crossover_elite_splice, crossover_two_point, heuristic_repair};
use super::decoder::{AcceptRule, Decoder};
use super::fitness::fitness;
use super::initialization::{random_chromosome, random_population};
use super::local_search::{improve, LocalSearchParams};
use super::mutation::{adaptive_rate, mutate, MutationPlan};
use super::selection::{adjusted_scores, diversity, select_parents};
use crate::config::{BeliefParams, Config, EvolutionParams, FitnessWeights};
use crate::core_types::{Chromosome, Path, Position};
use crate::error::TourResult;
use crate::solver::{make_rng, ProgressObserver, SolveOutcome, SolveRequest, Solver, Stats};
use fastrand::Rng;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const LIGHT_POPULATION: usize = 30;
const LIGHT_GENERATIONS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionProfile {
    pub level: u8,
    pub name: &'static str,
    pub accept: AcceptRule,
    /// Decoder difficulty, belief mutation, elite splicing and the knowledge bonus.
    pub belief_guidance: bool,
    pub adaptive_mutation: bool,
    pub local_search: bool,
    pub diversity_injection: bool,
    pub params: EvolutionParams,
    pub weights: FitnessWeights,
    pub belief: BeliefParams,
}

impl EvolutionProfile {
    /// Levels 1-3 run a light budget (at most 30 individuals for at most 100
    /// generations, chromosomes one board long) with preset weights. Level 4
    /// takes the configuration as given.
    pub fn for_level(level: u8, config: &Config) -> Option<Self> {
        match level {
            1 => Some(Self::simple(config)),
            2 => Some(Self::enhanced(config)),
            3 => Some(Self::cultural(config)),
            4 => Some(Self::advanced(config)),
            _ => None,
        }
    }

    /// Literal decoding scored on coverage alone.
    pub fn simple(config: &Config) -> Self {
        Self {
            level: 1,
            name: "simple-ga",
            accept: AcceptRule::Literal,
            weights: FitnessWeights::coverage_only(),
            ..Self::enhanced(config)
        }
    }

    /// Mobility-aware decoding without a belief space.
    pub fn enhanced(config: &Config) -> Self {
        let mut light = config.evolution.clone();
        light.population_size = light.population_size.min(LIGHT_POPULATION);
        light.generations = light.generations.min(LIGHT_GENERATIONS);
        light.chromosome_factor = 1;

        Self {
            level: 2,
            name: "enhanced-ga",
            accept: AcceptRule::Mobility,
            belief_guidance: false,
            adaptive_mutation: false,
            local_search: false,
            diversity_injection: false,
            params: light,
            weights: FitnessWeights::with_mobility(),
            belief: config.belief.clone(),
        }
    }

    pub fn cultural(config: &Config) -> Self {
        Self {
            level: 3,
            name: "cultural-ga",
            belief_guidance: true,
            ..Self::enhanced(config)
        }
    }

    pub fn advanced(config: &Config) -> Self {
        Self {
            level: 4,
            name: "advanced-cultural-ga",
            belief_guidance: true,
            adaptive_mutation: true,
            local_search: true,
            diversity_injection: true,
            params: config.evolution.clone(),
            weights: config.weights.clone(),
            ..Self::enhanced(config)
        }
    }

    pub fn decoder<'b>(&self, n: usize, belief: Option<&'b BeliefSpace>) -> Decoder<'b> {
        let decoder = Decoder::new(n, self.accept)
            .with_bootstrap(self.params.bootstrap_cells, self.params.bootstrap_difficulty);
        match belief {
            Some(b) if self.belief_guidance => decoder.with_belief(b),
            _ => decoder,
        }
    }

    pub fn chromosome_length(&self, n: usize) -> usize {
        (n * n * self.params.chromosome_factor).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_fitness: f64,
    pub average_fitness: f64,
    pub min_fitness: f64,
    pub diversity: f64,
    /// Fraction of the board covered by this generation's best path.
    pub best_coverage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperatorCounts {
    pub crossovers: u64,
    pub mutations: u64,
    pub local_searches: u64,
    pub diversity_injections: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvolutionReport {
    pub best_chromosome: Chromosome,
    pub best_path: Path,
    pub best_fitness: f64,
    pub generations_run: usize,
    pub history: Vec<GenerationRecord>,
    pub counts: OperatorCounts,
    pub final_diversity: f64,
    pub stagnation_level: f64,
    pub elapsed: Duration,
    pub success: bool,
}

impl EvolutionReport {
    pub fn best_coverage(&self, n: usize) -> f64 {
        if n == 0 {
            return 0.0;
        }
        self.best_path.len() as f64 / (n * n) as f64
    }
}

/// One evolutionary run on one board. Calling [`EvolutionEngine::run`] again
/// starts over from a fresh population and an empty belief space.
pub struct EvolutionEngine {
    profile: EvolutionProfile,
    rng: Rng,
    n: usize,
    start: Position,
    belief: BeliefSpace,
    population: Vec<Chromosome>,
    best: Option<EliteRecord>,
    counts: OperatorCounts,
}

impl EvolutionEngine {
    pub fn new(profile: EvolutionProfile, n: usize, start: Position, rng: Rng) -> Self {
        let belief = BeliefSpace::new(n, profile.belief.clone());
        Self {
            profile,
            rng,
            n,
            start,
            belief,
            population: Vec::new(),
            best: None,
            counts: OperatorCounts::default(),
        }
    }

    pub fn profile(&self) -> &EvolutionProfile {
        &self.profile
    }

    pub fn belief(&self) -> &BeliefSpace {
        &self.belief
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    pub fn run(&mut self, progress: &dyn ProgressObserver) -> EvolutionReport {
        let started = Instant::now();
        let params = self.profile.params.clone();
        let area = self.n * self.n;
        let length = self.profile.chromosome_length(self.n);

        self.population = random_population(&mut self.rng, params.population_size, length);
        self.belief = BeliefSpace::new(self.n, self.profile.belief.clone());
        self.best = None;
        self.counts = OperatorCounts::default();

        let mut history = Vec::with_capacity(params.generations);
        let mut current_diversity = diversity(&self.population, params.diversity_sample);

        for generation in 0..params.generations {
            if self.population.is_empty() {
                break;
            }

            // 1. Decode and score
            let (paths, mut scores) = self.evaluate_population();

            // 2. Learn
            self.belief.update(&self.population, &scores, &paths);

            // 3. Record
            let ranked = rank_descending(&scores);
            let leader = ranked[0];
            current_diversity = diversity(&self.population, params.diversity_sample);
            let record = GenerationRecord {
                generation,
                best_fitness: scores[leader],
                average_fitness: scores.iter().sum::<f64>() / scores.len() as f64,
                min_fitness: scores.iter().copied().fold(f64::INFINITY, f64::min),
                diversity: current_diversity,
                best_coverage: paths[leader].len() as f64 / area as f64,
            };

            // 4. Best ever
            if self.best.as_ref().map_or(true, |b| scores[leader] > b.fitness) {
                self.best = Some(EliteRecord {
                    chromosome: self.population[leader].clone(),
                    fitness: scores[leader],
                    path: paths[leader].clone(),
                });
            }

            if generation % params.progress_every_generations.max(1) == 0 {
                let percent = generation as f64 / params.generations as f64 * 100.0;
                progress.on_progress(
                    percent,
                    &format!(
                        "Generation {}: best fitness {:.1}, coverage {:.1}%",
                        generation,
                        record.best_fitness,
                        record.best_coverage * 100.0
                    ),
                );
            }
            debug!(
                generation,
                best = record.best_fitness,
                average = record.average_fitness,
                diversity = record.diversity,
                stagnation = self.belief.stagnation_level(),
                "Generation evaluated"
            );
            history.push(record);

            let complete = self.best.as_ref().is_some_and(|b| b.path.len() == area);
            if params.stop_on_success && complete {
                info!(generation, "Complete tour found, stopping early");
                break;
            }
            if generation + 1 == params.generations {
                break;
            }

            // 5. Local search
            if self.profile.local_search
                && generation > params.local_search_warmup
                && generation % params.local_search_interval.max(1) == 0
            {
                self.local_search(&ranked, &mut scores);
            }

            // 6. Diversity injection
            if self.profile.diversity_injection
                && generation > params.injection_warmup
                && generation % params.injection_interval.max(1) == 0
                && current_diversity < params.diversity_threshold
            {
                self.inject(&ranked, &mut scores);
                current_diversity = diversity(&self.population, params.diversity_sample);
            }

            // 7-8. Selection and reproduction
            self.reproduce(&scores, current_diversity);
        }

        let best = self.best.clone().unwrap_or(EliteRecord {
            chromosome: Vec::new(),
            fitness: 0.0,
            path: Vec::new(),
        });
        let success = area > 0 && best.path.len() == area;

        info!(
            profile = self.profile.name,
            generations = history.len(),
            best_fitness = best.fitness,
            coverage = best.path.len(),
            success,
            "Evolution finished"
        );

        EvolutionReport {
            best_chromosome: best.chromosome,
            best_path: best.path,
            best_fitness: best.fitness,
            generations_run: history.len(),
            history,
            counts: self.counts,
            final_diversity: current_diversity,
            stagnation_level: self.belief.stagnation_level(),
            elapsed: started.elapsed(),
            success,
        }
    }

    fn evaluate_population(&self) -> (Vec<Path>, Vec<f64>) {
        let decoder = self.profile.decoder(self.n, Some(&self.belief));
        let paths: Vec<Path> = self
            .population
            .iter()
            .map(|c| decoder.decode(c, self.start))
            .collect();
        let scores = paths
            .iter()
            .map(|p| fitness(p, self.n, &self.profile.weights))
            .collect();
        (paths, scores)
    }

    fn local_search(&mut self, ranked: &[usize], scores: &mut [f64]) {
        let Self {
            profile,
            rng,
            n,
            start,
            belief,
            population,
            counts,
            ..
        } = self;
        let belief: &BeliefSpace = belief;
        let params = &profile.params;
        let decoder = profile.decoder(*n, Some(belief));
        let guide = (profile.belief_guidance && belief.is_mature(params.belief_after_generation))
            .then_some(belief);
        let budget = LocalSearchParams {
            iterations: params.local_search_iterations,
            attempts: params.local_search_attempts,
        };

        for &i in ranked.iter().take(params.local_search_top) {
            let outcome = improve(&population[i], budget, guide, rng, |c| {
                fitness(&decoder.decode(c, *start), *n, &profile.weights)
            });
            counts.local_searches += 1;
            if outcome.improved {
                population[i] = outcome.chromosome;
                scores[i] = outcome.fitness;
            }
        }
    }

    fn inject(&mut self, ranked: &[usize], scores: &mut [f64]) {
        let length = self.profile.chromosome_length(self.n);
        let Self {
            profile,
            rng,
            n,
            start,
            belief,
            population,
            counts,
            ..
        } = self;
        let decoder = profile.decoder(*n, Some(&*belief));
        let count = ((ranked.len() as f64 * profile.params.injection_fraction) as usize)
            .clamp(1, ranked.len());

        for &i in ranked.iter().rev().take(count) {
            population[i] = random_chromosome(rng, length);
            scores[i] = fitness(&decoder.decode(&population[i], *start), *n, &profile.weights);
        }
        counts.diversity_injections += 1;
        debug!(replaced = count, "Injected fresh chromosomes");
    }

    fn reproduce(&mut self, scores: &[f64], current_diversity: f64) {
        let length = self.profile.chromosome_length(self.n);
        let Self {
            profile,
            rng,
            belief,
            population,
            best,
            counts,
            ..
        } = self;
        let belief: &BeliefSpace = belief;
        let params = &profile.params;
        let size = params.population_size;
        let mature = profile.belief_guidance && belief.is_mature(params.belief_after_generation);

        // 7. Selection on adjusted scores
        let knowledge = mature.then(|| {
            (
                belief,
                belief.generation_count() as f64 * params.knowledge_bonus,
            )
        });
        let adjusted = adjusted_scores(
            scores,
            population,
            best.as_ref().map(|b| b.chromosome.as_slice()),
            current_diversity * params.diversity_weight,
            knowledge,
        );
        let parents = select_parents(
            &adjusted,
            params.elitism_count,
            params.tournament_size,
            size / 2,
            rng,
        );
        if parents.is_empty() {
            return;
        }

        // 8. Reproduction
        let mut next: Vec<Chromosome> = rank_descending(scores)
            .into_iter()
            .take(params.elitism_count.min(size))
            .map(|i| population[i].clone())
            .collect();

        let stagnation = if profile.adaptive_mutation {
            belief.stagnation_level()
        } else {
            0.0
        };
        let plan = MutationPlan {
            rate: if profile.adaptive_mutation {
                adaptive_rate(params.mutation_rate, stagnation, params.stagnation_boost)
            } else {
                params.mutation_rate
            },
            stagnation,
            belief: mature.then_some(belief),
            belief_rate: params.belief_mutation_rate,
            random_gene_rate: params.random_gene_rate,
        };
        let elite = best
            .as_ref()
            .filter(|_| mature)
            .map(|b| b.chromosome.as_slice());

        while next.len() < size {
            let a = &population[parents[rng.usize(..parents.len())]];
            let b = &population[parents[rng.usize(..parents.len())]];
            let (first, second) = match elite {
                Some(e) if rng.f64() < params.elite_splice_rate => {
                    crossover_elite_splice(a, b, e, rng)
                }
                _ => crossover_two_point(a, b, rng),
            };
            counts.crossovers += 1;

            for child in [first, second] {
                if next.len() == size {
                    break;
                }
                let mut child = heuristic_repair(&child, length, rng);
                if mutate(&mut child, &plan, rng) {
                    counts.mutations += 1;
                }
                next.push(child);
            }
        }

        *population = next;
    }
}

/// Adapts an [`EvolutionEngine`] profile to the [`Solver`] contract.
pub struct EvolutionSolver {
    label: String,
    profile: EvolutionProfile,
}

impl EvolutionSolver {
    pub fn new(label: impl Into<String>, profile: EvolutionProfile) -> Self {
        Self {
            label: label.into(),
            profile,
        }
    }
}

impl Solver for EvolutionSolver {
    fn name(&self) -> &str {
        &self.label
    }

    fn solve(
        &mut self,
        request: &SolveRequest,
        progress: &dyn ProgressObserver,
    ) -> TourResult<SolveOutcome> {
        request.validate()?;
        let n = request.board_size;

        let mut engine = EvolutionEngine::new(
            self.profile.clone(),
            n,
            request.start,
            make_rng(request.seed),
        );
        let report = engine.run(progress);
        let belief = engine.belief();

        let mut stats = Stats::new()
            .with("algorithm", self.label.as_str())
            .with("profile", self.profile.name)
            .with("execution_time", report.elapsed.as_secs_f64())
            .with("generations_run", report.generations_run)
            .with("population_size", self.profile.params.population_size)
            .with("best_fitness", report.best_fitness)
            .with("best_coverage", report.best_coverage(n))
            .with("final_diversity", report.final_diversity)
            .with("stagnation_level", report.stagnation_level)
            .with("good_patterns", belief.patterns().len())
            .with("transitions_tracked", belief.transitions_tracked())
            .with("dangerous_transitions", belief.dangerous_count())
            .with("crossovers", report.counts.crossovers)
            .with("mutations", report.counts.mutations)
            .with("local_searches", report.counts.local_searches)
            .with("diversity_injections", report.counts.diversity_injections)
            .with("solution_length", report.best_path.len());
        if request.timeout.is_some() {
            stats.insert("timeout_ignored", true);
        }

        Ok(SolveOutcome {
            success: report.success,
            path: report.best_path,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::is_knight_move;
    use crate::solver::NoProgress;
    use std::cell::RefCell;
    use std::collections::HashSet;

    fn small_config(population: usize, generations: usize) -> Config {
        let mut config = Config::default();
        config.evolution.population_size = population;
        config.evolution.generations = generations;
        config
    }

    fn engine(level: u8, config: &Config, n: usize, seed: u64) -> EvolutionEngine {
        let profile = EvolutionProfile::for_level(level, config).expect("known level");
        EvolutionEngine::new(profile, n, Position::new(0, 0), Rng::with_seed(seed))
    }

    #[test]
    fn test_profiles_exist_for_levels_one_to_four() {
        let config = Config::default();
        assert!(EvolutionProfile::for_level(0, &config).is_none());
        assert!(EvolutionProfile::for_level(5, &config).is_none());

        let simple = EvolutionProfile::for_level(1, &config).unwrap();
        assert_eq!(simple.accept, AcceptRule::Literal);
        assert_eq!(simple.params.population_size, 30);
        assert_eq!(simple.params.generations, 100);
        assert!(!simple.belief_guidance);

        let advanced = EvolutionProfile::for_level(4, &config).unwrap();
        assert_eq!(advanced.params, config.evolution);
        assert_eq!(advanced.weights, config.weights);
        assert!(advanced.local_search && advanced.diversity_injection);
    }

    #[test]
    fn test_run_produces_valid_best_path() {
        let config = small_config(20, 15);
        let mut engine = engine(3, &config, 5, 17);
        let report = engine.run(&NoProgress);

        assert_eq!(report.generations_run, 15);
        assert_eq!(report.history.len(), 15);
        assert_eq!(report.best_path[0], Position::new(0, 0));
        let distinct: HashSet<_> = report.best_path.iter().collect();
        assert_eq!(distinct.len(), report.best_path.len());
        assert!(report.best_path.windows(2).all(|w| is_knight_move(w[0], w[1])));
        let best_recorded = report
            .history
            .iter()
            .map(|r| r.best_fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(report.best_fitness, best_recorded);
        assert_eq!(engine.population().len(), 20);
        assert_eq!(engine.belief().generation_count(), 15);
    }

    #[test]
    fn test_single_generation_best_matches_its_decode() {
        let config = small_config(12, 1);
        let mut engine = engine(2, &config, 5, 3);
        let report = engine.run(&NoProgress);

        let decoder = engine.profile().decoder(5, None);
        assert_eq!(
            decoder.decode(&report.best_chromosome, Position::new(0, 0)),
            report.best_path
        );
        assert_eq!(report.counts, OperatorCounts::default(), "No reproduction after the last generation");
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = small_config(16, 10);
        let a = engine(4, &config, 5, 99).run(&NoProgress);
        let b = engine(4, &config, 5, 99).run(&NoProgress);
        assert_eq!(a.best_chromosome, b.best_chromosome);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_local_search_schedule() {
        let config = small_config(20, 40);
        let report = engine(4, &config, 5, 8).run(&NoProgress);
        // Generations 25, 30 and 35, top three each.
        assert_eq!(report.counts.local_searches, 9);
        assert!(report.counts.crossovers > 0);
    }

    #[test]
    fn test_progress_every_ten_generations() {
        let config = small_config(10, 25);
        let calls = RefCell::new(Vec::new());
        let observer = |percent: f64, _msg: &str| calls.borrow_mut().push(percent);
        engine(1, &config, 5, 1).run(&observer);
        assert_eq!(*calls.borrow(), vec![0.0, 40.0, 80.0]);
    }

    #[test]
    fn test_single_cell_board_stops_on_success() {
        let mut config = small_config(6, 50);
        config.evolution.stop_on_success = true;
        let report = engine(2, &config, 1, 5).run(&NoProgress);
        assert!(report.success);
        assert_eq!(report.generations_run, 1);
        assert_eq!(report.best_path, vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_solver_reports_ignored_timeout() {
        let config = small_config(10, 5);
        let profile = EvolutionProfile::for_level(2, &config).unwrap();
        let mut solver = EvolutionSolver::new("cultural", profile);
        let request = SolveRequest::new(5, Position::new(0, 0))
            .with_timeout(Duration::from_millis(1))
            .with_seed(4);
        let outcome = solver.solve(&request, &NoProgress).unwrap();

        assert_eq!(outcome.stats.get("timeout_ignored").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(outcome.stats.get("generations_run").and_then(|v| v.as_u64()), Some(5));
        assert_eq!(outcome.success, outcome.path.len() == 25);
    }

    #[test]
    fn test_solver_rejects_invalid_start() {
        let profile = EvolutionProfile::for_level(1, &Config::default()).unwrap();
        let mut solver = EvolutionSolver::new("cultural", profile);
        let request = SolveRequest::new(5, Position::new(7, 0));
        assert!(solver.solve(&request, &NoProgress).is_err());
    }
}
