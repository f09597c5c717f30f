use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ahyper_core::{AnnotatedHypergraph, HypergraphError, Ident, LoadOptions, TabularDataset};
use serde_json::{json, Value};

fn write_dataset(dir: &Path, with_edges: bool) {
    fs::write(
        dir.join("incidence.csv"),
        "node_id,edge_id,role\n10,0,0\n11,0,1\n12,0,1\n11,1,0\n10,1,1\n",
    )
    .unwrap();
    fs::write(dir.join("roles.csv"), "0,from\n1,to\n").unwrap();
    if with_edges {
        fs::write(
            dir.join("edges.csv"),
            "edge_id,date,subject\n0,2001-05-01,\"re: budget, Q2\"\n1,2001-05-02,lunch\n",
        )
        .unwrap();
    }
}

#[test]
fn dataset_loads_with_integer_role_labels() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), false);

    let mut hg = AnnotatedHypergraph::from_incidence(dir.path(), LoadOptions::default()).unwrap();
    assert_eq!((hg.n(), hg.m()), (3, 2));
    assert_eq!(hg.roles(), &["0".to_string(), "1".to_string()]);
    assert_eq!(
        hg.edge_dimensions(),
        BTreeMap::from([(Ident::from(0), 3), (Ident::from(1), 2)])
    );
    assert!(hg.incidences().iter().all(|inc| inc.meta.is_none()));
    assert!(hg.config().source.is_some());
}

#[test]
fn dataset_relabels_and_attaches_metadata() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), true);

    let options = LoadOptions {
        relabel_roles: true,
        add_metadata: true,
    };
    let mut hg = AnnotatedHypergraph::from_incidence(dir.path(), options).unwrap();
    assert_eq!(hg.roles(), &["from".to_string(), "to".to_string()]);

    let records = hg.to_records();
    assert_eq!(
        records[0],
        json!({
            "date": "2001-05-01",
            "subject": "re: budget, Q2",
            "from": [10],
            "to": [11, 12],
            "eid": 0,
        })
    );
    assert_eq!(records[1]["subject"], Value::from("lunch"));
}

#[test]
fn missing_edges_file_is_allowed() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), false);

    let dataset = TabularDataset::read_dir(dir.path()).unwrap();
    assert!(dataset.edges.is_empty());
    assert_eq!(dataset.incidence.len(), 5);
    assert_eq!(dataset.roles, vec![(0, "from".to_string()), (1, "to".to_string())]);
}

#[test]
fn bad_role_cell_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    write_dataset(dir.path(), false);
    fs::write(dir.path().join("incidence.csv"), "node_id,edge_id,role\n1,0,0\n2,0,x\n").unwrap();

    match TabularDataset::read_dir(dir.path()) {
        Err(HypergraphError::Csv { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected csv error, got {other:?}"),
    }
}

#[test]
fn missing_incidence_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        TabularDataset::read_dir(dir.path()),
        Err(HypergraphError::Io(_))
    ));
}
