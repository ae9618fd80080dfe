//! Integration tests for the complete Triage pipeline
//!
//! These tests verify end-to-end functionality across crates:
//! - CSV sources → clean → SQLite table
//! - SQLite table → leading-verb flags
//!
//! Run with: cargo test --test integration_tests

use std::fs;

use tempfile::tempdir;
use triage_etl::{clean, load, read_table, save, save_with_types, Cell, PipelineConfig};
use triage_text::{texts_to_verb_flags, NlpContext};

// ============================================================================
// Merge pipeline
// ============================================================================

#[test]
fn test_single_message_scenario_lands_in_sqlite() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.csv");
    let categories = dir.path().join("categories.csv");
    fs::write(&messages, "id,genre,message\n1,direct,Help\n").unwrap();
    fs::write(&categories, "id,categories\n1,related-1;request-0\n").unwrap();

    let (m, c) = load(&messages, &categories).unwrap();
    let report = clean(m, c, &PipelineConfig::default()).unwrap();
    let db = dir.path().join("out.db");
    save_with_types(&report.frame, &report.column_types(), &db, "merged").unwrap();

    let frame = read_table(&db, "merged").unwrap();
    assert_eq!(
        frame.columns(),
        ["id", "message", "genre_direct", "related", "request"]
    );
    assert_eq!(
        frame.rows()[0],
        vec![
            Cell::Int(1),
            Cell::Text("Help".into()),
            Cell::Int(1),
            Cell::Int(1),
            Cell::Int(0),
        ]
    );
}

#[test]
fn test_rerun_replaces_previous_table() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.csv");
    let categories = dir.path().join("categories.csv");
    let db = dir.path().join("out.db");
    fs::write(&categories, "id,categories\n1,related-1\n2,related-0\n").unwrap();

    fs::write(&messages, "id,message,genre\n1,a,news\n2,b,news\n").unwrap();
    let (m, c) = load(&messages, &categories).unwrap();
    save(&clean(m, c, &PipelineConfig::default()).unwrap().frame, &db, "merged").unwrap();
    assert_eq!(read_table(&db, "merged").unwrap().len(), 2);

    // Second run: id 2 is now duplicated and drops out.
    fs::write(&messages, "id,message,genre\n1,a,news\n2,b,news\n2,c,news\n").unwrap();
    let (m, c) = load(&messages, &categories).unwrap();
    save(&clean(m, c, &PipelineConfig::default()).unwrap().frame, &db, "merged").unwrap();
    assert_eq!(read_table(&db, "merged").unwrap().len(), 1);
}

#[test]
fn test_missing_original_text_drops_row() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.csv");
    let categories = dir.path().join("categories.csv");
    fs::write(
        &messages,
        "id,message,original,genre\n1,Help,Aide,direct\n2,Water,,direct\n",
    )
    .unwrap();
    fs::write(&categories, "id,categories\n1,related-1\n2,related-1\n").unwrap();

    let (m, c) = load(&messages, &categories).unwrap();
    let report = clean(m, c, &PipelineConfig::default()).unwrap();
    assert_eq!(report.frame.len(), 1);
    assert_eq!(report.stats.incomplete_rows, 1);
}

// ============================================================================
// Merge → text features
// ============================================================================

#[test]
fn test_verb_flags_over_merged_messages() {
    let dir = tempdir().unwrap();
    let messages = dir.path().join("messages.csv");
    let categories = dir.path().join("categories.csv");
    fs::write(
        &messages,
        "id,message,genre\n1,Please send water to Jacmel.,direct\n2,The bridge is down.,news\n3,RT roads closed near the airport,social\n",
    )
    .unwrap();
    fs::write(
        &categories,
        "id,categories\n1,related-1;request-1\n2,related-1;request-0\n3,related-1;request-0\n",
    )
    .unwrap();

    let (m, c) = load(&messages, &categories).unwrap();
    let report = clean(m, c, &PipelineConfig::default()).unwrap();
    let texts: Vec<String> = report
        .frame
        .column("message")
        .unwrap()
        .map(|cell| cell.to_string())
        .collect();

    let ctx = NlpContext::default();
    assert_eq!(texts_to_verb_flags(&ctx, &texts), vec![true, false, true]);
}
