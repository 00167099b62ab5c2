//! Assembly of the crop-planning constraint model on top of the engine.

use itertools::Itertools;
use log::debug;
use thiserror::Error;

use crate::basic_types::Solution;
use crate::branching::InputOrder;
use crate::engine::graph::GraphVar;
use crate::engine::variables::DomainId;
use crate::engine::OptimisationResult;
use crate::engine::SatisfactionResult;
use crate::engine::Solver;
use crate::model::chordal;
use crate::model::data::ProblemData;
use crate::model::interval;
use crate::model::interval_graph::build_interval_graphs;
use crate::model::interval_graph::IntervalGraph;
use crate::model::precedence;
use crate::propagators::all_different::AllDifferentArgs;
use crate::propagators::bool_sum::BoolSumArgs;
use crate::propagators::chain_reuse::ChainReuseArgs;
use crate::propagators::distance::DistanceGreaterArgs;
use crate::propagators::increasing::IncreasingArgs;
use crate::propagators::interaction_gain::InteractionGainArgs;
use crate::propagators::interaction_gain_graph::InteractionGainGraphArgs;
use crate::propagators::not_equal::NotEqualArgs;
use crate::propagators::precedence_chain::PrecedenceChainArgs;
use crate::propagators::table::NegativeBinaryTableArgs;
use crate::propagators::table::PositiveTableArgs;
use crate::termination::TerminationCondition;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("the objective gain variable is already defined")]
    GainAlreadyDefined,
    #[error("no objective gain variable has been defined")]
    GainNotDefined,
    #[error("the instance has no precedence matrix")]
    MissingPrecedences,
    #[error("need {need} has no bed left after removing its forbidden beds")]
    NoAvailableBed { need: usize },
}

/// A crop-planning instance compiled to assignment variables and propagators.
///
/// Construction builds the interval graphs, creates one bed variable per
/// need, and posts the base model: an all-different per maximal clique of the
/// plain interval graph, and a strictly-increasing order over each duplicate
/// group to break its symmetry. The optional constraints and objectives are
/// posted through the `post_*` methods before solving.
#[derive(Debug)]
pub struct CropPlanProblem {
    data: ProblemData,
    solver: Solver,
    assignment: Vec<DomainId>,
    plain: IntervalGraph,
    with_rotations: IntervalGraph,
    gain: Option<DomainId>,
}

impl CropPlanProblem {
    pub fn new(data: ProblemData) -> Result<Self, ModelError> {
        let (plain, with_rotations) = build_interval_graphs(&data);
        let mut solver = Solver::new();

        let mut assignment = Vec::with_capacity(data.num_needs());
        for (index, need) in data.needs.iter().enumerate() {
            let values: Vec<i32> = match need.fixed_bed {
                Some(bed) => vec![bed],
                None => (1..=data.num_beds as i32)
                    .filter(|bed| !need.forbidden_beds.contains(bed))
                    .collect(),
            };
            if values.is_empty() {
                return Err(ModelError::NoAvailableBed { need: index });
            }
            assignment.push(solver.new_sparse_variable(&values));
        }

        let adjacency = plain.adjacency_lists();
        debug_assert!(chordal::is_chordal(&adjacency));
        let decomposition = chordal::decompose(&adjacency);
        debug!(
            "{} maximal cliques, clique number {}",
            decomposition.maximal_cliques.len(),
            decomposition
                .maximal_cliques
                .iter()
                .map(|clique| clique.len())
                .max()
                .unwrap_or(0)
        );
        for clique in &decomposition.maximal_cliques {
            if clique.len() < 2 {
                continue;
            }
            let variables = clique.iter().map(|&i| assignment[i]).collect();
            let _ = solver.add_propagator(AllDifferentArgs { variables });
        }

        for group in &data.groups {
            let variables = group.iter().map(|&i| assignment[i]).collect();
            let _ = solver.add_propagator(IncreasingArgs { variables });
        }

        Ok(CropPlanProblem {
            data,
            solver,
            assignment,
            plain,
            with_rotations,
            gain: None,
        })
    }

    pub fn data(&self) -> &ProblemData {
        &self.data
    }

    pub fn assignment(&self) -> &[DomainId] {
        &self.assignment
    }

    pub fn gain(&self) -> Option<DomainId> {
        self.gain
    }

    /// The minimum achievable bed distance between two needs under the
    /// current domains.
    fn min_bed_distance(&self, i: usize, j: usize) -> i32 {
        interval::min_distance(
            self.solver.lower_bound(self.assignment[i]),
            self.solver.upper_bound(self.assignment[i]),
            self.solver.lower_bound(self.assignment[j]),
            self.solver.upper_bound(self.assignment[j]),
        )
    }

    /// Rotation delays: needs connected only in the rotation-extended graph
    /// must not share a bed.
    pub fn post_rotation_constraints(&mut self) {
        for (i, j) in self.with_rotations.edges() {
            if self.plain.contains_edge(i, j) {
                continue;
            }
            let _ = self.solver.add_propagator(NotEqualArgs {
                x: self.assignment[i],
                y: self.assignment[j],
            });
        }
    }

    /// Overlapping crops of species that interact negatively must keep a bed
    /// distance greater than one.
    pub fn post_forbid_negative_interactions(&mut self) {
        for (i, j) in (0..self.data.num_needs()).tuple_combinations() {
            let species_i = self.data.needs[i].species;
            let species_j = self.data.needs[j].species;
            if self.data.interaction(species_i, species_j) < 0
                && self.plain.contains_edge(i, j)
                && self.min_bed_distance(i, j) <= 1
            {
                let _ = self.solver.add_propagator(DistanceGreaterArgs {
                    x: self.assignment[i],
                    y: self.assignment[j],
                    threshold: 1,
                });
            }
        }
    }

    /// Overlapping crops of the same species must not sit on adjacent beds.
    pub fn post_dilute_species(&mut self) {
        for (i, j) in (0..self.data.num_needs()).tuple_combinations() {
            if self.data.needs[i].species == self.data.needs[j].species
                && self.plain.contains_edge(i, j)
                && self.min_bed_distance(i, j) <= 1
            {
                let mut forbidden = Vec::new();
                for a in self.solver.assignments().domain_values(self.assignment[i]) {
                    for &b in self.data.adjacent_beds(a) {
                        forbidden.push((a, b));
                    }
                }
                let _ = self.solver.add_propagator(NegativeBinaryTableArgs {
                    x: self.assignment[i],
                    y: self.assignment[j],
                    forbidden,
                });
            }
        }
    }

    /// Each duplicate group is confined to a run of consecutive, pairwise
    /// adjacent beds.
    pub fn post_group_identical_crops(&mut self) {
        for group in self.data.groups.clone() {
            let variables: Box<[DomainId]> = group.iter().map(|&i| self.assignment[i]).collect();
            let length = variables.len() as i32;

            let mut tuples = Vec::new();
            for start in self.solver.assignments().domain_values(variables[0]) {
                let connected = (start + 1..start + length).all(|bed| {
                    bed <= self.data.num_beds as i32 && self.data.beds_adjacent(bed - 1, bed)
                });
                if connected {
                    tuples.push((start..start + length).collect());
                }
            }
            let _ = self
                .solver
                .add_propagator(PositiveTableArgs { variables, tuples });
        }
    }

    /// Harmful precedences: a crop must not directly follow a harmful
    /// predecessor in the same bed.
    pub fn post_forbid_negative_precedences(&mut self) -> Result<(), ModelError> {
        if self.data.precedences.is_none() {
            return Err(ModelError::MissingPrecedences);
        }
        let chains = precedence::forbidden_precedence_chains(&self.data);
        for (i, j) in chains.not_equal_pairs {
            let _ = self.solver.add_propagator(NotEqualArgs {
                x: self.assignment[i],
                y: self.assignment[j],
            });
        }
        for chain in chains.chains {
            let sequence = chain.iter().map(|&i| self.assignment[i]).collect();
            let _ = self
                .solver
                .add_propagator(PrecedenceChainArgs { sequence });
        }
        Ok(())
    }

    /// First objective: the number of beneficial interactions realized by
    /// placing the two crops on adjacent beds. With `graph_variant` the gain
    /// is synchronised through a graph domain instead of pair enumeration.
    pub fn post_adjacency_gain(&mut self, graph_variant: bool) -> Result<DomainId, ModelError> {
        if self.gain.is_some() {
            return Err(ModelError::GainAlreadyDefined);
        }

        let mut pairs = Vec::new();
        for (i, j) in (0..self.data.num_needs()).tuple_combinations() {
            let species_i = self.data.needs[i].species;
            let species_j = self.data.needs[j].species;
            if self.data.interaction(species_i, species_j) == 1
                && self.plain.contains_edge(i, j)
                && self.min_bed_distance(i, j) <= 1
            {
                pairs.push((i, j));
            }
        }

        let gain = self.solver.new_bounded_variable(0, pairs.len() as i32);
        if graph_variant {
            let mut graph = GraphVar::new(self.data.num_needs());
            for &(i, j) in &pairs {
                graph.add_possible_edge(i, j);
            }
            let graph = self.solver.new_graph_variable(graph);
            let _ = self.solver.add_propagator(InteractionGainGraphArgs {
                graph,
                gain,
                variables: self.assignment.clone().into_boxed_slice(),
                pairs: pairs.into_boxed_slice(),
            });
        } else {
            let variable_pairs = pairs
                .into_iter()
                .map(|(i, j)| (self.assignment[i], self.assignment[j]))
                .collect();
            let _ = self.solver.add_propagator(InteractionGainArgs {
                gain,
                pairs: variable_pairs,
            });
        }
        self.gain = Some(gain);
        Ok(gain)
    }

    /// Second objective: the number of beneficial precedences realized by
    /// reusing a bed without an interrupting crop.
    pub fn post_reuse_gain(&mut self) -> Result<DomainId, ModelError> {
        if self.gain.is_some() {
            return Err(ModelError::GainAlreadyDefined);
        }
        if self.data.precedences.is_none() {
            return Err(ModelError::MissingPrecedences);
        }

        let chains = precedence::beneficial_precedence_chains(&self.data);
        let mut indicators = Vec::with_capacity(chains.len());
        for chain in &chains {
            let indicator = self.solver.new_bounded_variable(0, 1);
            let sequence = chain.iter().map(|&i| self.assignment[i]).collect();
            let _ = self.solver.add_propagator(ChainReuseArgs {
                sequence,
                indicator,
            });
            indicators.push(indicator);
        }

        let gain = self.solver.new_bounded_variable(0, indicators.len() as i32);
        let _ = self.solver.add_propagator(BoolSumArgs {
            booleans: indicators.into_boxed_slice(),
            sum: gain,
        });
        self.gain = Some(gain);
        Ok(gain)
    }

    pub fn solve(&mut self, termination: &mut impl TerminationCondition) -> SatisfactionResult {
        let mut brancher = InputOrder::new(self.assignment.clone());
        let result = self.solver.solve(&mut brancher, termination);
        self.solver.log_statistics();
        result
    }

    /// Maximise the configured gain variable.
    pub fn maximise(
        &mut self,
        termination: &mut impl TerminationCondition,
    ) -> Result<OptimisationResult, ModelError> {
        let objective = self.gain.ok_or(ModelError::GainNotDefined)?;
        let mut brancher = InputOrder::new(self.assignment.clone());
        let result = self.solver.maximise(objective, &mut brancher, termination);
        self.solver.log_statistics();
        Ok(result)
    }

    /// One line per bed listing its crops in start order.
    pub fn readable_solution(&self, solution: &Solution) -> Vec<String> {
        (1..=self.data.num_beds as i32)
            .map(|bed| {
                let mut needs: Vec<usize> = (0..self.assignment.len())
                    .filter(|&i| solution.value(self.assignment[i]) == bed)
                    .collect();
                needs.sort_by_key(|&i| self.data.needs[i].begin);

                let mut line = format!("Planche {bed}: ");
                for (k, &need) in needs.iter().enumerate() {
                    if k > 0 {
                        line.push_str("--");
                    }
                    let species = self.data.species_name(self.data.needs[need].species);
                    line.push_str(&format!(
                        " [{species}: {} -> {}] ",
                        self.data.needs[need].begin, self.data.needs[need].end
                    ));
                }
                line
            })
            .collect()
    }

    /// A bed-by-week grid; each occupied cell holds the need index.
    pub fn csv_solution(&self, solution: &Solution) -> Vec<Vec<String>> {
        let max_week = self.data.max_week();
        (1..=self.data.num_beds as i32)
            .map(|bed| {
                let mut row = vec![String::new(); max_week as usize + 1];
                row[0] = format!("Planche {bed}");
                for i in 0..self.assignment.len() {
                    if solution.value(self.assignment[i]) != bed {
                        continue;
                    }
                    for week in self.data.needs[i].begin..=self.data.needs[i].end {
                        row[week as usize] = i.to_string();
                    }
                }
                row
            })
            .collect()
    }
}
