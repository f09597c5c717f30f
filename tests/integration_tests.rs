//! Integration tests for the complete ahyper pipeline
//!
//! These tests verify end-to-end functionality across the workspace:
//! - Records → Store → Statistics → Records
//! - Dataset directory → Store → Null-model sample
//! - Store → Projection → Modularity
//!
//! Run with: cargo test --test integration_tests

use std::collections::BTreeMap;
use std::fs;

use ahyper_core::{
    AnnotatedHypergraph, Ident, LoadOptions, McmcOptions, McmcStatus, ProjectionExport,
    ProjectionFormats,
};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};
use tempfile::tempdir;

/// Small email-like corpus: one sender, several recipients, optional cc.
fn email_records() -> Vec<Value> {
    vec![
        json!({"eid": 100, "subject": "kickoff", "from": ["ann"], "to": ["bob", "cy"], "cc": ["dee"]}),
        json!({"eid": 101, "subject": "re: kickoff", "from": ["bob"], "to": ["ann"], "cc": ["cy"]}),
        json!({"eid": 102, "subject": "lunch", "from": ["cy"], "to": ["dee", "bob"], "cc": []}),
        json!({"eid": 103, "subject": "budget", "from": ["dee"], "to": ["ann"], "cc": ["bob", "eve"]}),
        json!({"eid": 104, "subject": "misc", "from": ["eve"], "to": ["cy"], "cc": []}),
    ]
}

const EMAIL_ROLES: [&str; 3] = ["from", "to", "cc"];

fn per_role_degree_totals(hg: &mut AnnotatedHypergraph) -> BTreeMap<String, usize> {
    let mut totals = BTreeMap::new();
    for counts in hg.node_degrees_by_role().into_values() {
        for (role, c) in counts {
            *totals.entry(role).or_insert(0) += c;
        }
    }
    totals
}

// ============================================================================
// Records → Store → Records
// ============================================================================

#[test]
fn test_records_round_trip_keeps_metadata() {
    let records = email_records();
    let mut hg = AnnotatedHypergraph::from_records(&records, EMAIL_ROLES).expect("valid records");

    assert_eq!(hg.n(), 5);
    assert_eq!(hg.m(), 5);
    assert_eq!(hg.incidences().len(), 16);

    let out = hg.to_records();
    assert_eq!(out.len(), 5);
    assert_eq!(out[0]["subject"], json!("kickoff"));
    assert_eq!(out[0]["eid"], json!(100));
    assert_eq!(out[2]["cc"], json!([]));
}

#[test]
fn test_statistics_by_role() {
    let mut hg = AnnotatedHypergraph::from_records(&email_records(), EMAIL_ROLES).unwrap();

    let degrees = hg.node_degrees_by_role();
    let bob = &degrees[&Ident::from("bob")];
    assert_eq!(bob.get("from"), Some(&1));
    assert_eq!(bob.get("to"), Some(&2));
    assert_eq!(bob.get("cc"), Some(&1));

    let d = hg.node_degree_matrix();
    let k = hg.edge_dimension_matrix();
    assert_eq!(d.dim(), (5, 3));
    assert_eq!(k.dim(), (5, 3));
    // Both matrices count every incidence exactly once.
    assert_eq!(d.sum(), 16.0);
    assert_eq!(k.sum(), 16.0);
    assert_eq!(d.sum_axis(ndarray::Axis(0)), k.sum_axis(ndarray::Axis(0)));
}

// ============================================================================
// Null models
// ============================================================================

#[test]
fn test_mcmc_preserves_degrees_and_dimensions() {
    let mut hg = AnnotatedHypergraph::from_records(&email_records(), EMAIL_ROLES).unwrap();
    let degrees = hg.node_degrees_by_role();
    let dims = hg.edge_dimensions_by_role();

    let mut rng = StdRng::seed_from_u64(2024);
    let report = hg.mcmc(
        &mut rng,
        &McmcOptions {
            n_steps: 50,
            max_attempts: Some(100_000),
            ..McmcOptions::default()
        },
    );

    assert_eq!(report.status, McmcStatus::Completed);
    assert_eq!(report.accepted, 50);
    assert_eq!(hg.node_degrees_by_role(), degrees);
    assert_eq!(hg.edge_dimensions_by_role(), dims);
    assert_eq!(hg.count_degeneracies(), 0);
}

#[test]
fn test_stub_matching_sample_shape() {
    let mut hg = AnnotatedHypergraph::from_records(&email_records(), EMAIL_ROLES).unwrap();
    let totals = per_role_degree_totals(&mut hg);

    let mut rng = StdRng::seed_from_u64(9);
    let mut sample = hg.stub_matching(&mut rng);

    assert_eq!(sample.edge_dimensions_by_role(), hg.edge_dimensions_by_role());
    assert_eq!(per_role_degree_totals(&mut sample), totals);
    assert_eq!(sample.to_records()[3]["subject"], json!("budget"));
}

// ============================================================================
// Projection → Modularity
// ============================================================================

#[test]
fn test_projection_and_modularity() {
    let mut hg = AnnotatedHypergraph::from_records(&email_records(), EMAIL_ROLES).unwrap();

    // Only sender -> recipient interactions count.
    let mut r = Array2::zeros((3, 3));
    r[[0, 1]] = 1.0;
    r[[0, 2]] = 0.5;
    hg.assign_role_interaction_matrix(Some(r)).unwrap();

    let p = hg.projection_matrix();
    let nodes = hg.node_list().to_vec();
    let at = |name: &str| nodes.iter().position(|n| *n == Ident::from(name)).unwrap();
    assert_eq!(p[[at("ann"), at("bob")]], 1.0);
    assert_eq!(p[[at("ann"), at("dee")]], 0.5);
    assert_eq!(p[[at("bob"), at("ann")]], 1.0);
    assert_eq!(p[[at("bob"), at("cy")]], 0.5);
    assert_eq!(p[[at("cy"), at("ann")]], 0.0);

    let null = hg.null_expectation_matrix();
    let q = hg.modularity_matrix(false);
    for ((pi, ni), qi) in p.iter().zip(null.iter()).zip(q.iter()) {
        assert!((pi - ni - qi).abs() < 1e-12);
    }
    let total_weight: f64 = p.sum();
    assert!((null.sum() - total_weight).abs() < 1e-9);

    let qs = hg.modularity_matrix(true);
    assert_eq!(qs, qs.t());

    match hg
        .export_projection(ProjectionFormats { digraph: true, ..Default::default() })
        .unwrap()
    {
        ProjectionExport::DiGraph(g) => assert_eq!(g.node_count(), 5),
        other => panic!("expected digraph, got {other:?}"),
    }
}

// ============================================================================
// Dataset directory → Store → Cleanup
// ============================================================================

#[test]
fn test_dataset_directory_pipeline() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("incidence.csv"),
        "node_id,edge_id,role\n1,7,0\n2,7,1\n1,7,1\n3,8,0\n4,9,0\n4,9,1\n2,9,1\n",
    )
    .unwrap();
    fs::write(dir.path().join("roles.csv"), "0,from\n1,to\n").unwrap();
    fs::write(
        dir.path().join("edges.csv"),
        "edge_id,day\n7,1\n8,2\n9,3\n",
    )
    .unwrap();

    let mut hg = AnnotatedHypergraph::from_incidence(
        dir.path(),
        LoadOptions {
            relabel_roles: true,
            add_metadata: true,
        },
    )
    .unwrap();
    assert_eq!((hg.n(), hg.m()), (4, 3));
    assert_eq!(hg.count_degeneracies(), 2);

    let precedence = BTreeMap::from([("from".to_string(), 0), ("to".to_string(), 1)]);
    assert_eq!(hg.remove_degeneracies(&precedence).unwrap(), 2);
    assert_eq!(hg.count_degeneracies(), 0);

    assert_eq!(hg.remove_singletons(), 1);
    assert_eq!((hg.n(), hg.m()), (3, 2));
    assert_eq!(hg.edge_list(), &[Ident::from(0), Ident::from(1)]);

    let records = hg.to_records();
    assert_eq!(records[0], json!({"day": 1, "from": [0], "to": [1], "eid": 0}));
    assert_eq!(records[1], json!({"day": 3, "from": [2], "to": [1], "eid": 1}));
}
