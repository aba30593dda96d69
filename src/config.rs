use crate::error::{TourError, TourResult};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub evolution: EvolutionParams,
    #[command(flatten)]
    pub weights: FitnessWeights,
    #[command(flatten)]
    pub belief: BeliefParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchParams {
    /// Backtracking wall-clock budget in seconds (0 disables the deadline)
    #[arg(long, default_value_t = 60.0)]
    pub timeout_secs: f64,
    #[arg(long, default_value_t = 5)]
    pub progress_every_calls: u64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            timeout_secs: 60.0,
            progress_every_calls: 5,
        }
    }
}

impl SearchParams {
    pub fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs > 0.0 {
            Duration::try_from_secs_f64(self.timeout_secs).ok()
        } else {
            None
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvolutionParams {
    #[arg(long, default_value_t = 150)]
    pub population_size: usize,
    #[arg(long, default_value_t = 300)]
    pub generations: usize,
    /// Chromosome length as a multiple of the board area
    #[arg(long, default_value_t = 2)]
    pub chromosome_factor: usize,

    // === Reproduction ===
    #[arg(long, default_value_t = 0.3)]
    pub mutation_rate: f64,
    #[arg(long, default_value_t = 0.3)]
    pub stagnation_boost: f64,
    #[arg(long, default_value_t = 2)]
    pub elitism_count: usize,
    #[arg(long, default_value_t = 3)]
    pub tournament_size: usize,
    #[arg(long, default_value_t = 0.3)]
    pub elite_splice_rate: f64,
    #[arg(long, default_value_t = 0.7)]
    pub belief_mutation_rate: f64,
    #[arg(long, default_value_t = 0.2)]
    pub random_gene_rate: f64,

    // === Selection ===
    /// Novelty bonus per unit of population diversity, scaled by each
    /// individual's distance from the best-ever chromosome
    #[arg(long, default_value_t = 0.05)]
    pub diversity_weight: f64,
    /// Per-generation knowledge bonus once beliefs are mature, scaled by how
    /// well an individual's genes match successful moves
    #[arg(long, default_value_t = 0.01)]
    pub knowledge_bonus: f64,
    #[arg(long, default_value_t = 20)]
    pub belief_after_generation: usize,
    #[arg(long, default_value_t = 10)]
    pub diversity_sample: usize,

    // === Decoder ===
    #[arg(long, default_value_t = 5)]
    pub bootstrap_cells: usize,
    #[arg(long, default_value_t = 0.7)]
    pub bootstrap_difficulty: f64,

    // === Local Search ===
    #[arg(long, default_value_t = 20)]
    pub local_search_warmup: usize,
    #[arg(long, default_value_t = 5)]
    pub local_search_interval: usize,
    #[arg(long, default_value_t = 3)]
    pub local_search_top: usize,
    #[arg(long, default_value_t = 3)]
    pub local_search_iterations: usize,
    #[arg(long, default_value_t = 10)]
    pub local_search_attempts: usize,

    // === Diversity Injection ===
    #[arg(long, default_value_t = 30)]
    pub injection_warmup: usize,
    #[arg(long, default_value_t = 15)]
    pub injection_interval: usize,
    #[arg(long, default_value_t = 0.3)]
    pub diversity_threshold: f64,
    #[arg(long, default_value_t = 0.2)]
    pub injection_fraction: f64,

    // === Control ===
    #[arg(long, default_value_t = 10)]
    pub progress_every_generations: usize,
    #[arg(long, default_value_t = false)]
    pub stop_on_success: bool,
}

impl Default for EvolutionParams {
    fn default() -> Self {
        Self {
            population_size: 150,
            generations: 300,
            chromosome_factor: 2,
            mutation_rate: 0.3,
            stagnation_boost: 0.3,
            elitism_count: 2,
            tournament_size: 3,
            elite_splice_rate: 0.3,
            belief_mutation_rate: 0.7,
            random_gene_rate: 0.2,
            diversity_weight: 0.05,
            knowledge_bonus: 0.01,
            belief_after_generation: 20,
            diversity_sample: 10,
            bootstrap_cells: 5,
            bootstrap_difficulty: 0.7,
            local_search_warmup: 20,
            local_search_interval: 5,
            local_search_top: 3,
            local_search_iterations: 3,
            local_search_attempts: 10,
            injection_warmup: 30,
            injection_interval: 15,
            diversity_threshold: 0.3,
            injection_fraction: 0.2,
            progress_every_generations: 10,
            stop_on_success: false,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessWeights {
    #[arg(long, default_value_t = 20.0)]
    pub weight_unique: f64,
    #[arg(long, default_value_t = 10.0)]
    pub weight_legal: f64,
    #[arg(long, default_value_t = 4.0)]
    pub weight_run: f64,
    #[arg(long, default_value_t = 2.0)]
    pub weight_mobility: f64,
    #[arg(long, default_value_t = 5.0)]
    pub weight_low_degree: f64,
    #[arg(long, default_value_t = 15.0)]
    pub penalty_revisit: f64,
    #[arg(long, default_value_t = 500.0)]
    pub bonus_complete: f64,
    #[arg(long, default_value_t = 2)]
    pub low_degree_threshold: usize,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            weight_unique: 20.0,
            weight_legal: 10.0,
            weight_run: 4.0,
            weight_mobility: 2.0,
            weight_low_degree: 5.0,
            penalty_revisit: 15.0,
            bonus_complete: 500.0,
            low_degree_threshold: 2,
        }
    }
}

impl FitnessWeights {
    /// Coverage and legality only.
    pub fn coverage_only() -> Self {
        Self {
            weight_unique: 10.0,
            weight_legal: 5.0,
            weight_run: 0.0,
            weight_mobility: 0.0,
            weight_low_degree: 0.0,
            penalty_revisit: 0.0,
            bonus_complete: 0.0,
            ..Self::default()
        }
    }

    /// Coverage and legality plus a mobility reward.
    pub fn with_mobility() -> Self {
        Self {
            weight_mobility: 2.0,
            penalty_revisit: 5.0,
            ..Self::coverage_only()
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BeliefParams {
    #[arg(long, default_value_t = 3)]
    pub elite_archive_size: usize,
    #[arg(long, default_value_t = 15)]
    pub pattern_archive_size: usize,
    #[arg(long, default_value_t = 0.2)]
    pub top_fraction: f64,
    #[arg(long, default_value_t = 0.1)]
    pub bottom_fraction: f64,
    /// A "successful" individual scores above this multiple of the board area
    #[arg(long, default_value_t = 7.0)]
    pub success_fitness_multiple: f64,
    #[arg(long, default_value_t = 0.8)]
    pub position_success_coverage: f64,
    #[arg(long, default_value_t = 0.7)]
    pub pattern_coverage: f64,
    #[arg(long, default_value_t = 0.5)]
    pub danger_coverage: f64,
    #[arg(long, default_value_t = 1.0)]
    pub stagnation_epsilon: f64,
    #[arg(long, default_value_t = 30.0)]
    pub stagnation_horizon: f64,
    #[arg(long, default_value_t = 10)]
    pub warmup_generations: usize,
    #[arg(long, default_value_t = 0.2)]
    pub exploration_rate: f64,
    #[arg(long, default_value_t = 0.7)]
    pub success_weight: f64,
    #[arg(long, default_value_t = 0.3)]
    pub usage_weight: f64,
}

impl Default for BeliefParams {
    fn default() -> Self {
        Self {
            elite_archive_size: 3,
            pattern_archive_size: 15,
            top_fraction: 0.2,
            bottom_fraction: 0.1,
            success_fitness_multiple: 7.0,
            position_success_coverage: 0.8,
            pattern_coverage: 0.7,
            danger_coverage: 0.5,
            stagnation_epsilon: 1.0,
            stagnation_horizon: 30.0,
            warmup_generations: 10,
            exploration_rate: 0.2,
            success_weight: 0.7,
            usage_weight: 0.3,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TourResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> TourResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Rejects parameter combinations that would make a run meaningless.
    pub fn validate(&self) -> TourResult<()> {
        let evo = &self.evolution;
        if evo.population_size == 0 {
            return Err(TourError::Config("population_size must be at least 1".into()));
        }
        if evo.chromosome_factor == 0 {
            return Err(TourError::Config("chromosome_factor must be at least 1".into()));
        }
        if evo.tournament_size == 0 {
            return Err(TourError::Config("tournament_size must be at least 1".into()));
        }
        for (name, value) in [
            ("mutation_rate", evo.mutation_rate),
            ("elite_splice_rate", evo.elite_splice_rate),
            ("belief_mutation_rate", evo.belief_mutation_rate),
            ("random_gene_rate", evo.random_gene_rate),
            ("injection_fraction", evo.injection_fraction),
            ("top_fraction", self.belief.top_fraction),
            ("bottom_fraction", self.belief.bottom_fraction),
            ("exploration_rate", self.belief.exploration_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TourError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }
        let secs = self.search.timeout_secs;
        if secs < 0.0 || Duration::try_from_secs_f64(secs).is_err() {
            return Err(TourError::Config(format!(
                "timeout_secs must be a non-negative, representable duration, got {}",
                secs
            )));
        }
        Ok(())
    }

    /// Copies every flag that was explicitly given on the command line over
    /// values loaded from a file.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.timeout_secs);
        update_if_present!(search.progress_every_calls);

        update_if_present!(evolution.population_size);
        update_if_present!(evolution.generations);
        update_if_present!(evolution.chromosome_factor);
        update_if_present!(evolution.mutation_rate);
        update_if_present!(evolution.stagnation_boost);
        update_if_present!(evolution.elitism_count);
        update_if_present!(evolution.tournament_size);
        update_if_present!(evolution.elite_splice_rate);
        update_if_present!(evolution.belief_mutation_rate);
        update_if_present!(evolution.random_gene_rate);
        update_if_present!(evolution.diversity_weight);
        update_if_present!(evolution.knowledge_bonus);
        update_if_present!(evolution.belief_after_generation);
        update_if_present!(evolution.diversity_sample);
        update_if_present!(evolution.bootstrap_cells);
        update_if_present!(evolution.bootstrap_difficulty);
        update_if_present!(evolution.local_search_warmup);
        update_if_present!(evolution.local_search_interval);
        update_if_present!(evolution.local_search_top);
        update_if_present!(evolution.local_search_iterations);
        update_if_present!(evolution.local_search_attempts);
        update_if_present!(evolution.injection_warmup);
        update_if_present!(evolution.injection_interval);
        update_if_present!(evolution.diversity_threshold);
        update_if_present!(evolution.injection_fraction);
        update_if_present!(evolution.progress_every_generations);
        update_if_present!(evolution.stop_on_success);

        update_if_present!(weights.weight_unique);
        update_if_present!(weights.weight_legal);
        update_if_present!(weights.weight_run);
        update_if_present!(weights.weight_mobility);
        update_if_present!(weights.weight_low_degree);
        update_if_present!(weights.penalty_revisit);
        update_if_present!(weights.bonus_complete);
        update_if_present!(weights.low_degree_threshold);

        update_if_present!(belief.elite_archive_size);
        update_if_present!(belief.pattern_archive_size);
        update_if_present!(belief.top_fraction);
        update_if_present!(belief.bottom_fraction);
        update_if_present!(belief.success_fitness_multiple);
        update_if_present!(belief.position_success_coverage);
        update_if_present!(belief.pattern_coverage);
        update_if_present!(belief.danger_coverage);
        update_if_present!(belief.stagnation_epsilon);
        update_if_present!(belief.stagnation_horizon);
        update_if_present!(belief.warmup_generations);
        update_if_present!(belief.exploration_rate);
        update_if_present!(belief.success_weight);
        update_if_present!(belief.usage_weight);
    }
}
