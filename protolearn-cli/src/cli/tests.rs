//! Unit tests for the CLI commands and data-ingestion helpers.

use super::commands::{read_samples, run_train, shrink_min_samples};
use super::{CliError, ExecutionSummary, TrainCommand, render_summary};

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_dir() -> TempDir {
    TempDir::new().expect("tempdir must be created")
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture file must be written");
    path
}

fn two_dim_linear_param_desc() -> &'static str {
    "2\nlinear essential 0.0 100.0\nlinear essential 0.0 100.0\n"
}

fn train_command(dir: &TempDir, param_desc: PathBuf, samples: PathBuf) -> TrainCommand {
    TrainCommand {
        param_desc,
        samples,
        class_label: "a".to_owned(),
        font_id: 0,
        normproto_out: dir.path().join("out.normproto"),
        microfeat_out: None,
        max_num_protos: 16,
        max_distance: f32::INFINITY,
        proto_style: super::ProtoStyleArg::Elliptical,
        min_samples: 0.1,
        max_illegal: 0.5,
        independence: 0.9,
        confidence: 0.01,
        magic_samples: 0,
        retry_shrink: 0.95,
        max_retries: 3,
    }
}

#[test]
fn train_writes_normproto_for_a_tight_cluster() -> TestResult {
    let dir = temp_dir();
    let param_desc = write_file(&dir, "params.txt", two_dim_linear_param_desc());
    let samples = write_file(
        &dir,
        "samples.txt",
        "0 10.0 10.0\n0 10.1 9.9\n0 9.9 10.1\n0 10.2 10.0\n0 9.8 9.9\n",
    );
    let command = train_command(&dir, param_desc, samples);

    let summary = run_train(&command)?;
    assert_eq!(summary.class_label, "a");
    assert!(summary.prototypes_emitted >= 1);

    let dumped = fs::read_to_string(&command.normproto_out)?;
    assert!(dumped.contains('2'), "normproto dump should echo the sample_size header");
    Ok(())
}

#[test]
fn train_merges_two_pages_into_one_microfeat_library() -> TestResult {
    let dir = temp_dir();
    let param_desc = write_file(&dir, "params.txt", two_dim_linear_param_desc());
    let samples = write_file(
        &dir,
        "samples.txt",
        "0 10.0 10.0\n0 10.1 9.9\n0 9.9 10.1\n0 10.2 10.0\n0 9.8 9.9\n",
    );
    let microfeat_out = dir.path().join("out.microfeat");

    let mut command = train_command(&dir, param_desc.clone(), samples.clone());
    command.microfeat_out = Some(microfeat_out.clone());
    run_train(&command)?;
    let first_dump = fs::read_to_string(&microfeat_out)?;

    run_train(&command)?;
    let second_dump = fs::read_to_string(&microfeat_out)?;

    assert!(!first_dump.is_empty());
    assert!(!second_dump.is_empty());
    Ok(())
}

#[test]
fn train_rejects_feature_count_mismatch() -> TestResult {
    let dir = temp_dir();
    let param_desc = write_file(&dir, "params.txt", two_dim_linear_param_desc());
    let samples = write_file(&dir, "samples.txt", "0 1.0\n");
    let command = train_command(&dir, param_desc, samples);

    let err = run_train(&command).expect_err("mismatched feature count must fail");
    assert!(matches!(err, CliError::MalformedSample { .. }));
    Ok(())
}

#[test]
fn read_samples_skips_blank_lines() -> TestResult {
    let dir = temp_dir();
    let path = write_file(&dir, "samples.txt", "0 1.0 2.0\n\n1 3.0 4.0\n");
    let samples = read_samples(&path, 2)?;
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].1, 0);
    assert_eq!(samples[1].1, 1);
    Ok(())
}

#[test]
fn shrink_min_samples_applies_the_retry_factor() {
    let shrunk = shrink_min_samples(0.2, 0.95);
    assert!((shrunk - 0.19).abs() < 1e-6);
}

#[test]
fn render_summary_writes_expected_lines() {
    let summary = ExecutionSummary {
        class_label: "a".to_owned(),
        attempts: 1,
        prototypes_emitted: 2,
        significant_prototypes: 1,
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer).expect("render must succeed");
    let text = String::from_utf8(buffer).expect("output must be UTF-8");
    assert!(text.contains("class: a"));
    assert!(text.contains("driver retries: 1"));
    assert!(text.contains("prototypes: 2"));
    assert!(text.contains("significant: 1"));
}
