#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

fn run_solver(args: &[&str]) -> Output {
    let solver = PathBuf::from(env!("CARGO_BIN_EXE_cpbp-solver"));
    Command::new(solver)
        .args(args)
        .output()
        .expect("the solver could be started")
}

fn read_beliefs(path: &Path) -> Vec<Vec<f64>> {
    std::fs::read_to_string(path)
        .expect("the results were written")
        .lines()
        .map(|line| {
            line.split_whitespace()
                .map(|belief| belief.parse::<f64>().expect("a number"))
                .collect()
        })
        .collect()
}

fn rhythm_line(previous_tokens: &[i32], scores: [f64; 3]) -> String {
    previous_tokens
        .iter()
        .map(i32::to_string)
        .chain(scores.iter().map(f64::to_string))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn results_are_written_next_to_the_data() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("cp_rhythm_0_4.dat");
    let lines = [
        rhythm_line(&[2, 1, 1, 0], [0.2, 0.3, 0.5]),
        rhythm_line(&[0, 0, 2, 1], [0.6, 0.2, 0.2]),
    ];
    std::fs::write(&data, lines.join("\n")).expect("wrote the data");

    let output = run_solver(&[
        "rhythm-increasing-reset",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "2",
        "--index",
        "4",
        "--group-size",
        "2",
    ]);

    assert!(output.status.success());
    let beliefs = read_beliefs(&directory.path().join("cp_rhythm_0_4_results.dat"));
    assert_eq!(beliefs.len(), 2);
    for line in &beliefs {
        assert_eq!(line.len(), 3);
        assert!((line.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn inconsistent_samples_get_the_fallback_beliefs() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("data.dat");
    let results = directory.path().join("beliefs.txt");
    let inconsistency_log = directory.path().join("inconsistencies.txt");
    std::fs::write(&data, rhythm_line(&[5], [0.2, 0.3, 0.5])).expect("wrote the data");

    let output = run_solver(&[
        "rhythm-alldifferent-lastbar",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "1",
        "--output",
        results.to_str().expect("utf-8 path"),
        "--inconsistency-log",
        inconsistency_log.to_str().expect("utf-8 path"),
    ]);

    assert!(output.status.success());
    assert_eq!(read_beliefs(&results), vec![vec![1.0, 0.0, 0.0]]);
    assert_eq!(
        std::fs::read_to_string(&inconsistency_log).expect("the count was written"),
        "1\n"
    );
}

#[test]
fn increasing_reset_exits_with_code_two_on_an_inconsistency() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("data.dat");
    std::fs::write(&data, rhythm_line(&[5], [0.2, 0.3, 0.5])).expect("wrote the data");

    let output = run_solver(&[
        "rhythm-increasing-reset",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "1",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn increasing_reset_can_write_fallback_beliefs_instead() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("data.dat");
    let results = directory.path().join("beliefs.txt");
    std::fs::write(&data, rhythm_line(&[5], [0.2, 0.3, 0.5])).expect("wrote the data");

    let output = run_solver(&[
        "rhythm-increasing-reset",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "1",
        "--output",
        results.to_str().expect("utf-8 path"),
        "--on-inconsistency",
        "fallback",
    ]);

    assert!(output.status.success());
    assert_eq!(read_beliefs(&results), vec![vec![1.0, 0.0, 0.0]]);
}

#[test]
fn alldifferent_lastbar_can_abort_instead() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("data.dat");
    std::fs::write(&data, rhythm_line(&[5], [0.2, 0.3, 0.5])).expect("wrote the data");

    let output = run_solver(&[
        "rhythm-alldifferent-lastbar",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "1",
        "--on-inconsistency",
        "abort",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn pitch_key_exits_with_code_two_on_an_inconsistency() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("pitch.dat");
    let rhythm = directory.path().join("token_rhythm.dat");

    // Holds only: no onset can play the pitch classes of the key.
    std::fs::write(&rhythm, vec!["1"; 128].join(" ")).expect("wrote the rhythm");
    std::fs::write(&data, vec!["0.02"; 50].join(" ")).expect("wrote the data");

    let output = run_solver(&[
        "pitch-key",
        data.to_str().expect("utf-8 path"),
        "--rhythm-tokens",
        rhythm.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_data_exits_with_code_one() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("missing.dat");
    let results = directory.path().join("beliefs.txt");

    let output = run_solver(&[
        "rhythm-increasing-reset",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "0",
        "--output",
        results.to_str().expect("utf-8 path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!results.exists());
}

#[test]
fn missing_rhythm_tokens_leave_no_results_behind() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("pitch.dat");
    let rhythm = directory.path().join("missing_rhythm.dat");
    std::fs::write(&data, vec!["0.02"; 50].join(" ")).expect("wrote the data");

    let output = run_solver(&[
        "pitch-key",
        data.to_str().expect("utf-8 path"),
        "--rhythm-tokens",
        rhythm.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!directory.path().join("pitch_results.dat").exists());
}

#[test]
fn truncated_data_exits_with_code_three() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("data.dat");
    std::fs::write(&data, "0.2 0.3").expect("wrote the data");

    let output = run_solver(&[
        "rhythm-increasing-reset",
        data.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "0",
    ]);

    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn pitch_key_reports_fifty_beliefs() {
    let directory = tempfile::tempdir().expect("created a directory");
    let data = directory.path().join("pitch.dat");
    let rhythm = directory.path().join("token_rhythm.dat");

    let mut rhythm_tokens = vec!["2"; 7];
    rhythm_tokens.extend(vec!["1"; 121]);
    std::fs::write(&rhythm, rhythm_tokens.join(" ")).expect("wrote the rhythm");
    std::fs::write(&data, vec!["0.02"; 50].join(" ")).expect("wrote the data");

    let output = run_solver(&[
        "pitch-key",
        data.to_str().expect("utf-8 path"),
        "--rhythm-tokens",
        rhythm.to_str().expect("utf-8 path"),
        "--samples",
        "1",
        "--index",
        "0",
        "--min-occurrences",
        "1",
        "--belief-representation",
        "log",
    ]);

    assert!(output.status.success());
    let beliefs = read_beliefs(&directory.path().join("pitch_results.dat"));
    assert_eq!(beliefs.len(), 1);
    assert_eq!(beliefs[0].len(), 50);
    assert_eq!(beliefs[0][48], 0.0);
    assert_eq!(beliefs[0][49], 0.0);
    // Only the classes of the key can be played.
    assert_eq!(beliefs[0][1], 0.0);
    assert!(beliefs[0][0] > 0.0);
    assert!((beliefs[0].iter().sum::<f64>() - 1.0).abs() < 1e-6);
}
