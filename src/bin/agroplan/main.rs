use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use agroplan::model::CropPlanProblem;
use agroplan::model::DataError;
use agroplan::model::ModelError;
use agroplan::model::ProblemData;
use agroplan::termination::Indefinite;
use agroplan::termination::TerminationCondition;
use agroplan::termination::TimeBudget;
use agroplan::OptimisationResult;
use agroplan::SatisfactionResult;
use agroplan::Solution;
use clap::Parser;
use clap::ValueEnum;
use log::error;
use log::info;
use log::warn;
use log::LevelFilter;
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(author, version, about = "Agroecological crop-planning solver", long_about = None)]
struct Args {
    /// The needs file: one crop request per row (species, period, quantity,
    /// forbidden and fixed beds, family, return delay).
    needs: PathBuf,

    /// The species-by-species interaction matrix.
    interactions: PathBuf,

    /// The beds file: one row per bed with its adjacent bed numbers.
    beds: PathBuf,

    /// The species-by-species precedence matrix. Required for the precedence
    /// constraint and the reuse objective.
    #[arg(long)]
    precedences: Option<PathBuf>,

    /// The species-by-species rotation delay matrix. When given, rotation
    /// edges follow the matrix instead of the same-family rule.
    #[arg(long)]
    delays: Option<PathBuf>,

    /// Wall-clock budget in seconds; unlimited when omitted.
    #[arg(long)]
    timeout: Option<u64>,

    /// What to optimise.
    #[arg(long, value_enum, default_value_t = Objective::Sat)]
    objective: Objective,

    /// The optional constraints to post on top of the base model.
    #[arg(long, value_enum, value_delimiter = ',')]
    constraints: Vec<Constraint>,

    /// Write the solution as a ';'-separated bed-by-week grid to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the per-bed crop sequences of the solution.
    #[arg(long)]
    show: bool,

    /// Print debug logs.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Objective {
    /// Find any feasible plan.
    Sat,
    /// Maximise beneficial interactions between adjacent beds.
    Interactions,
    /// Like `interactions`, synchronised through a graph domain.
    InteractionsGraph,
    /// Maximise beneficial precedences through bed reuse.
    Precedences,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Constraint {
    /// Rotation delays between crops of the same family or species.
    Rotation,
    /// No negative interactions between adjacent beds.
    Interaction,
    /// No same-species crops on adjacent beds.
    Dilution,
    /// Duplicate groups on runs of consecutive adjacent beds.
    Grouping,
    /// No harmful precedences within a bed.
    Precedence,
}

#[derive(Debug, Error)]
enum AgroplanError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("failed to write the solution: {0}")]
    Output(#[from] csv::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    configure_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(reason) => {
            error!("{reason}");
            ExitCode::FAILURE
        }
    }
}

fn configure_logging(verbose: bool) {
    let level_filter = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(level_filter)
        .target(env_logger::Target::Stdout)
        .init();
}

fn run(args: Args) -> Result<(), AgroplanError> {
    let data = ProblemData::from_files(
        &args.needs,
        &args.interactions,
        &args.beds,
        args.precedences.as_deref(),
        args.delays.as_deref(),
    )?;
    info!(
        "instance with {} needs, {} species, {} beds",
        data.num_needs(),
        data.species_names.len(),
        data.num_beds
    );

    let mut problem = CropPlanProblem::new(data)?;
    for constraint in &args.constraints {
        match constraint {
            Constraint::Rotation => problem.post_rotation_constraints(),
            Constraint::Interaction => problem.post_forbid_negative_interactions(),
            Constraint::Dilution => problem.post_dilute_species(),
            Constraint::Grouping => problem.post_group_identical_crops(),
            Constraint::Precedence => problem.post_forbid_negative_precedences()?,
        }
    }

    let solution = match args.timeout {
        Some(seconds) => {
            let mut budget = TimeBudget::starting_now(Duration::from_secs(seconds));
            optimise(&mut problem, args.objective, &mut budget)?
        }
        None => optimise(&mut problem, args.objective, &mut Indefinite)?,
    };

    let Some(solution) = solution else {
        return Ok(());
    };

    if args.show {
        for line in problem.readable_solution(&solution) {
            println!("{line}");
        }
    }
    if let Some(path) = &args.output {
        write_solution_grid(&problem, &solution, path)?;
        info!("solution grid written to {}", path.display());
    }
    Ok(())
}

fn optimise(
    problem: &mut CropPlanProblem,
    objective: Objective,
    termination: &mut impl TerminationCondition,
) -> Result<Option<Solution>, ModelError> {
    if objective == Objective::Sat {
        return Ok(match problem.solve(termination) {
            SatisfactionResult::Satisfiable(solution) => Some(solution),
            SatisfactionResult::Unsatisfiable => {
                warn!("the instance is unsatisfiable");
                None
            }
            SatisfactionResult::Unknown => {
                warn!("no solution found within the time budget");
                None
            }
        });
    }

    let gain = match objective {
        Objective::Interactions => problem.post_adjacency_gain(false)?,
        Objective::InteractionsGraph => problem.post_adjacency_gain(true)?,
        Objective::Precedences => problem.post_reuse_gain()?,
        Objective::Sat => unreachable!(),
    };

    Ok(match problem.maximise(termination)? {
        OptimisationResult::Optimal(solution) => {
            info!("optimal objective value {}", solution.value(gain));
            Some(solution)
        }
        OptimisationResult::Satisfiable(solution) => {
            info!(
                "best objective value within the budget {}",
                solution.value(gain)
            );
            Some(solution)
        }
        OptimisationResult::Unsatisfiable => {
            warn!("the instance is unsatisfiable");
            None
        }
        OptimisationResult::Unknown => {
            warn!("no solution found within the time budget");
            None
        }
    })
}

fn write_solution_grid(
    problem: &CropPlanProblem,
    solution: &Solution,
    path: &std::path::Path,
) -> Result<(), csv::Error> {
    let file = File::create(path).map_err(csv::Error::from)?;
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);
    for row in problem.csv_solution(solution) {
        writer.write_record(&row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
