//! ahyper CLI
//!
//! Command-line access to annotated hypergraphs:
//! - Summary statistics (degrees, dimensions, degeneracies)
//! - Null-model samples (MCMC node swaps, stub matching)
//! - Weighted projections and modularity matrices
//! - Cleanup (singleton and degeneracy removal)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ahyper_core::{
    AnnotatedHypergraph, Ident, McmcOptions, McmcStatus, ProjectionExport, ProjectionFormats,
    RoleCounts, SelfPairPolicy,
};
use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};
use tracing_subscriber::EnvFilter;

mod input;

use input::{matrix_to_json, parse_precedence, read_role_matrix, write_json, InputArgs};

#[derive(Parser)]
#[command(name = "ahyper")]
#[command(author, version, about = "Role-annotated hypergraph statistics and null models")]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// Seed for every random draw; omit for an entropy-seeded run.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sizes, degeneracies, node degrees and edge dimensions as JSON.
    Stats {
        /// Break degrees and dimensions down by role.
        #[arg(long)]
        by_role: bool,
    },

    /// Randomize by degree-preserving node swaps and write the sample as records.
    Randomize {
        /// Number of accepted swaps.
        #[arg(long, default_value_t = 1)]
        steps: u64,

        /// Swap within role partitions without rejecting degenerate edges.
        #[arg(long)]
        stub_labeled: bool,

        /// Allow swaps between incidences of different roles.
        #[arg(long)]
        ignore_roles: bool,

        /// Give up after this many proposals.
        #[arg(long)]
        max_attempts: Option<u64>,

        /// Never propose a swap within a single edge.
        #[arg(long)]
        exclude_self_pairs: bool,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Draw one stub-matched sample and write it as records.
    StubMatch {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write the weighted projection (nested map by default).
    Project {
        #[arg(long)]
        nested: bool,

        /// Dense matrix ordered by the sorted node list.
        #[arg(long)]
        matrix: bool,

        /// Node list plus weighted arc list.
        #[arg(long)]
        digraph: bool,

        /// Role-interaction matrix as a JSON array of rows.
        #[arg(long)]
        role_matrix: Option<PathBuf>,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write the modularity matrix (projection minus null expectation).
    Modularity {
        /// Average the matrix with its transpose.
        #[arg(long)]
        symmetrize: bool,

        #[arg(long)]
        role_matrix: Option<PathBuf>,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Remove singleton edges and/or repeated nodes, then write records.
    Clean {
        #[arg(long)]
        singletons: bool,

        /// `role=rank,...`; within an edge the lowest rank wins.
        #[arg(long)]
        precedence: Option<String>,

        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut hg = cli.input.load()?;

    match cli.command {
        Commands::Stats { by_role } => cmd_stats(&mut hg, by_role),
        Commands::Randomize {
            steps,
            stub_labeled,
            ignore_roles,
            max_attempts,
            exclude_self_pairs,
            out,
        } => {
            let options = McmcOptions {
                n_steps: steps,
                avoid_degeneracy: !stub_labeled,
                preserve_roles: !ignore_roles,
                max_attempts,
                self_pairs: if exclude_self_pairs {
                    SelfPairPolicy::Exclude
                } else {
                    SelfPairPolicy::Lazy
                },
            };
            cmd_randomize(&mut hg, &mut rng(cli.seed), &options, out.as_deref())
        }
        Commands::StubMatch { out } => {
            let mut sample = hg.stub_matching(&mut rng(cli.seed));
            write_records(&mut sample, out.as_deref())
        }
        Commands::Project {
            nested,
            matrix,
            digraph,
            role_matrix,
            out,
        } => {
            let formats = ProjectionFormats {
                nested,
                matrix,
                digraph,
            };
            cmd_project(&mut hg, formats, role_matrix.as_deref(), out.as_deref())
        }
        Commands::Modularity {
            symmetrize,
            role_matrix,
            out,
        } => {
            if let Some(path) = role_matrix.as_deref() {
                hg.assign_role_interaction_matrix(Some(read_role_matrix(path)?))?;
            }
            let q = hg.modularity_matrix(symmetrize);
            write_json(out.as_deref(), &matrix_to_json(&q))?;
            report_written(out.as_deref());
            Ok(())
        }
        Commands::Clean {
            singletons,
            precedence,
            out,
        } => cmd_clean(&mut hg, singletons, precedence.as_deref(), out.as_deref()),
    }
}

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn cmd_stats(hg: &mut AnnotatedHypergraph, by_role: bool) -> Result<()> {
    let degeneracies = hg.count_degeneracies();
    let (degrees, dimensions) = if by_role {
        (
            role_counts_json(hg.node_degrees_by_role()),
            role_counts_json(hg.edge_dimensions_by_role()),
        )
    } else {
        (counts_json(hg.node_degrees()), counts_json(hg.edge_dimensions()))
    };

    let stats = json!({
        "n": hg.n(),
        "m": hg.m(),
        "incidences": hg.incidences().len(),
        "roles": hg.roles(),
        "degeneracies": degeneracies,
        "node_degrees": degrees,
        "edge_dimensions": dimensions,
    });
    write_json(None, &stats)
}

fn cmd_randomize(
    hg: &mut AnnotatedHypergraph,
    rng: &mut StdRng,
    options: &McmcOptions,
    out: Option<&Path>,
) -> Result<()> {
    let report = hg.mcmc(rng, options);
    match report.status {
        McmcStatus::Completed => eprintln!(
            "{} {} swaps accepted, {} rejected",
            "ok".green().bold(),
            report.accepted,
            report.rejected
        ),
        McmcStatus::Exhausted => eprintln!(
            "{} stopped after {} of {} swaps ({} rejected)",
            "exhausted".yellow().bold(),
            report.accepted,
            options.n_steps,
            report.rejected
        ),
    }
    write_records(hg, out)
}

fn cmd_project(
    hg: &mut AnnotatedHypergraph,
    formats: ProjectionFormats,
    role_matrix: Option<&Path>,
    out: Option<&Path>,
) -> Result<()> {
    // Reject conflicting flags before reading anything else.
    formats.resolve()?;
    if let Some(path) = role_matrix {
        hg.assign_role_interaction_matrix(Some(read_role_matrix(path)?))?;
    }

    let value = match hg.export_projection(formats)? {
        ProjectionExport::Nested(projection) => Value::Object(
            projection
                .into_iter()
                .map(|(source, targets)| {
                    let targets: Map<String, Value> = targets
                        .into_iter()
                        .map(|(target, w)| (target.to_string(), json!(w)))
                        .collect();
                    (source.to_string(), Value::Object(targets))
                })
                .collect(),
        ),
        ProjectionExport::Matrix(matrix) => json!({
            "nodes": hg.node_list().iter().map(Ident::to_json).collect::<Vec<_>>(),
            "matrix": matrix_to_json(&matrix),
        }),
        ProjectionExport::DiGraph(graph) => {
            let nodes: Vec<Value> = graph.node_weights().map(Ident::to_json).collect();
            let arcs: Vec<Value> = graph
                .raw_edges()
                .iter()
                .map(|e| {
                    json!({
                        "source": graph[e.source()].to_json(),
                        "target": graph[e.target()].to_json(),
                        "weight": e.weight,
                    })
                })
                .collect();
            json!({ "nodes": nodes, "arcs": arcs })
        }
    };

    write_json(out, &value)?;
    report_written(out);
    Ok(())
}

fn cmd_clean(
    hg: &mut AnnotatedHypergraph,
    singletons: bool,
    precedence: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    if !singletons && precedence.is_none() {
        eprintln!(
            "{} nothing to clean; pass --singletons and/or --precedence",
            "warning".yellow().bold()
        );
    }
    if let Some(list) = precedence {
        let removed = hg.remove_degeneracies(&parse_precedence(list)?)?;
        eprintln!("{} {removed} degenerate incidences removed", "ok".green().bold());
    }
    if singletons {
        let removed = hg.remove_singletons();
        eprintln!("{} {removed} singleton incidences removed", "ok".green().bold());
    }
    write_records(hg, out)
}

fn write_records(hg: &mut AnnotatedHypergraph, out: Option<&Path>) -> Result<()> {
    write_json(out, &Value::from(hg.to_records()))?;
    report_written(out);
    Ok(())
}

fn report_written(out: Option<&Path>) {
    if let Some(path) = out {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
}

fn counts_json(counts: BTreeMap<Ident, usize>) -> Value {
    Value::Object(
        counts
            .into_iter()
            .map(|(id, count)| (id.to_string(), json!(count)))
            .collect(),
    )
}

fn role_counts_json(counts: BTreeMap<Ident, RoleCounts>) -> Value {
    Value::Object(
        counts
            .into_iter()
            .map(|(id, by_role)| (id.to_string(), json!(by_role)))
            .collect(),
    )
}
