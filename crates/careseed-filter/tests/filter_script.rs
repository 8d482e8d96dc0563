use std::fs;
use std::path::PathBuf;

use careseed_filter::{FilterRules, SkipReason, apply, filter_file, partition, render};

const SCRIPT: &str = "\
-- COMPREHENSIVE SEED DATA - 16 Tables
-- Generated: 2024-06-01T09:00:00
-- Run this in the SQL editor of the target database

-- 1. AGENCIES (1 records)
INSERT INTO agencies (id, name) VALUES ('a1', 'Dominion Healthcare Services Ltd');

-- 2. PROFILES (2 records)
INSERT INTO profiles (id, agency_id) VALUES ('p1', 'a1');
INSERT INTO profiles (id, agency_id) VALUES ('p2', 'a1');

-- 3. STAFF (1 records)
INSERT INTO staff (id, agency_id, \"references\") VALUES ('s1', 'a1', '[]'::jsonb);

-- 4. CLIENTS (0 records)

";

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("careseed_filter_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

#[test]
fn partitions_on_headers_and_table_markers() {
    let sections = partition(SCRIPT).expect("partition");
    let names: Vec<&str> = sections.iter().map(|section| section.name()).collect();
    assert_eq!(
        names,
        vec![
            "-- COMPREHENSIVE SEED DATA - 16 Tables",
            "-- 1. AGENCIES (1 records)",
            "-- 2. PROFILES (2 records)",
            "-- 3. STAFF (1 records)",
            "-- 4. CLIENTS (0 records)",
        ]
    );
}

#[test]
fn drops_profiles_headers_and_empty_sections() {
    let outcome = apply(partition(SCRIPT).expect("partition"), &FilterRules::default());

    let kept: Vec<&str> = outcome.kept.iter().map(|section| section.name()).collect();
    assert_eq!(
        kept,
        vec!["-- 1. AGENCIES (1 records)", "-- 3. STAFF (1 records)"]
    );

    let reasons: Vec<&SkipReason> = outcome.skipped.iter().map(|skip| &skip.reason).collect();
    assert_eq!(
        reasons,
        vec![
            &SkipReason::NoInserts,
            &SkipReason::Excluded("profiles".to_string()),
            &SkipReason::NoInserts,
        ]
    );

    let text = render(&outcome);
    assert_eq!(
        text,
        "-- FILTERED SEED DATA (Skipped profiles)\n\n\
         -- 1. AGENCIES (1 records)\n\
         INSERT INTO agencies (id, name) VALUES ('a1', 'Dominion Healthcare Services Ltd');\n\n\n\
         -- 3. STAFF (1 records)\n\
         INSERT INTO staff (id, agency_id, \"references\") VALUES ('s1', 'a1', '[]'::jsonb);\n\n\n"
    );
    assert!(!text.contains("INSERT INTO profiles"));
}

#[test]
fn custom_exclusions_replace_the_default() {
    let rules = FilterRules {
        excluded: vec!["staff".to_string(), "agencies".to_string()],
    };
    let outcome = apply(partition(SCRIPT).expect("partition"), &rules);
    let kept: Vec<&str> = outcome.kept.iter().map(|section| section.name()).collect();
    assert_eq!(kept, vec!["-- 2. PROFILES (2 records)"]);
    assert!(render(&outcome).starts_with("-- FILTERED SEED DATA (Skipped staff, agencies)\n\n"));
}

#[test]
fn filters_a_script_file() {
    let dir = temp_out_dir("file");
    let input = dir.join("seed_data.sql");
    let output = dir.join("out/seed_data_filtered.sql");
    fs::write(&input, SCRIPT).expect("write input");

    let outcome = filter_file(&input, &output, &FilterRules::default()).expect("filter file");
    assert_eq!(outcome.kept.len(), 2);

    let written = fs::read_to_string(&output).expect("read output");
    assert_eq!(written, render(&outcome));

    let _ = fs::remove_dir_all(dir);
}
