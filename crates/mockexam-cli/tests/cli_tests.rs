//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FAR_TEMPLATE: &str = "../../templates/far-practice.toml";
const FAR_POOL: &str = "../../pools/far-practice.json";

fn mockexam() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("mockexam").unwrap();
    // Keep a developer's own config from leaking into the tests.
    cmd.env("HOME", std::env::temp_dir())
        .env_remove("MOCKEXAM_TEMPLATES_DIR")
        .env_remove("MOCKEXAM_OUTPUT_DIR");
    cmd
}

/// Generate the FAR practice exam into `dir` and return its path.
fn generate_exam(dir: &Path, seed: &str) -> PathBuf {
    let exam_path = dir.join("exam.json");
    mockexam()
        .arg("generate")
        .arg("--template")
        .arg(FAR_TEMPLATE)
        .arg("--pool")
        .arg(FAR_POOL)
        .arg("--seed")
        .arg(seed)
        .arg("--output")
        .arg(&exam_path)
        .assert()
        .success();
    exam_path
}

/// Answer map JSON with the correct option for every question in the exam.
fn perfect_answers(exam_path: &Path) -> String {
    let exam: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(exam_path).unwrap()).unwrap();
    let answers: serde_json::Map<String, serde_json::Value> = exam["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| {
            (
                q["id"].as_str().unwrap().to_string(),
                q["correct_option"].clone(),
            )
        })
        .collect();
    serde_json::Value::Object(answers).to_string()
}

#[test]
fn help_output() {
    mockexam()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("mock exam generator and scorer"));
}

#[test]
fn version_output() {
    mockexam()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mockexam"));
}

#[test]
fn list_templates_shows_catalog() {
    mockexam()
        .arg("list-templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("cpa-far-mcq"))
        .stdout(predicate::str::contains("cfp-mini"));
}

#[test]
fn list_templates_filters_by_certification() {
    mockexam()
        .arg("list-templates")
        .arg("--certification")
        .arg("cfp")
        .assert()
        .success()
        .stdout(predicate::str::contains("cfp-full"))
        .stdout(predicate::str::contains("cpa-aud-mcq").not());
}

#[test]
fn validate_template_directory() {
    mockexam()
        .arg("validate")
        .arg("--template")
        .arg("../../templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("FAR Practice Drill"))
        .stdout(predicate::str::contains("CFP Domain Drill"))
        .stdout(predicate::str::contains("All templates valid"));
}

#[test]
fn validate_template_with_pool() {
    mockexam()
        .arg("validate")
        .arg("--template")
        .arg(FAR_TEMPLATE)
        .arg("--pool")
        .arg(FAR_POOL)
        .assert()
        .success()
        .stdout(predicate::str::contains("20 questions, 5 areas"))
        .stdout(predicate::str::contains("All templates valid"));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lopsided.toml");
    std::fs::write(
        &path,
        r#"
[template]
id = "lopsided"
name = "Lopsided"
total_questions = 10

[[blueprint]]
area = "A"
weight = 30
"#,
    )
    .unwrap();

    mockexam()
        .arg("validate")
        .arg("--template")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("weights sum to 30.0"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    mockexam()
        .arg("validate")
        .arg("--template")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn generate_is_reproducible_with_seed() {
    let run = || {
        mockexam()
            .arg("generate")
            .arg("--template")
            .arg(FAR_TEMPLATE)
            .arg("--pool")
            .arg(FAR_POOL)
            .arg("--seed")
            .arg("cli-seed")
            .output()
            .unwrap()
    };

    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let exam: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(exam["seed"], "cli-seed");
    assert_eq!(exam["questions"].as_array().unwrap().len(), 20);
}

#[test]
fn generate_session_seed_is_stable() {
    let run = || {
        mockexam()
            .arg("generate")
            .arg("--template")
            .arg(FAR_TEMPLATE)
            .arg("--pool")
            .arg(FAR_POOL)
            .arg("--session")
            .arg("student-42")
            .output()
            .unwrap()
    };

    let first = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, run().stdout);

    let exam: serde_json::Value = serde_json::from_slice(&first.stdout).unwrap();
    assert_eq!(exam["seed"], "far-practice:student-42");
}

#[test]
fn generate_warns_when_pool_is_too_small() {
    mockexam()
        .arg("generate")
        .arg("--template")
        .arg("cpa-far-mcq")
        .arg("--pool")
        .arg(FAR_POOL)
        .arg("--seed")
        .arg("small-pool")
        .assert()
        .success()
        .stderr(predicate::str::contains("Warning: pool exhausted: selected 60 of 66"));
}

#[test]
fn generate_unknown_template() {
    mockexam()
        .arg("generate")
        .arg("--template")
        .arg("cpa-nope")
        .arg("--pool")
        .arg(FAR_POOL)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown template 'cpa-nope'"));
}

#[test]
fn score_empty_answers_fails_exam() {
    let dir = TempDir::new().unwrap();
    let exam = generate_exam(dir.path(), "score-empty");
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, "{}").unwrap();

    mockexam()
        .arg("score")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("20 question(s) to review"))
        .stdout(predicate::str::contains("Study recommendations"));
}

#[test]
fn score_perfect_answers_passes_and_writes_reports() {
    let dir = TempDir::new().unwrap();
    let exam = generate_exam(dir.path(), "score-perfect");
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, perfect_answers(&exam)).unwrap();
    let saved = dir.path().join("reports").join("attempt.json");
    let html = dir.path().join("reports").join("attempt.html");

    mockexam()
        .arg("score")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .arg("--format")
        .arg("json")
        .arg("--save")
        .arg(&saved)
        .arg("--html")
        .arg(&html)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": true"))
        .stdout(predicate::str::contains("\"scaled_score\": 99.0"));

    assert!(saved.exists());
    assert!(std::fs::read_to_string(&html).unwrap().contains("<svg"));
}

#[test]
fn score_save_defaults_to_output_dir() {
    let dir = TempDir::new().unwrap();
    let exam = generate_exam(dir.path(), "score-default-dir");
    let answers = dir.path().join("answers.json");
    std::fs::write(&answers, "{}").unwrap();
    let results = dir.path().join("results");

    mockexam()
        .env("MOCKEXAM_OUTPUT_DIR", &results)
        .arg("score")
        .arg("--exam")
        .arg(&exam)
        .arg("--answers")
        .arg(&answers)
        .arg("--save")
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to"));

    let saved: Vec<_> = std::fs::read_dir(&results).unwrap().collect();
    assert_eq!(saved.len(), 1);
}

#[test]
fn compare_detects_regression() {
    let dir = TempDir::new().unwrap();
    let exam = generate_exam(dir.path(), "compare");
    let perfect = dir.path().join("perfect.json");
    let empty = dir.path().join("empty.json");
    std::fs::write(&perfect, perfect_answers(&exam)).unwrap();
    std::fs::write(&empty, "{}").unwrap();

    let baseline = dir.path().join("baseline.json");
    let current = dir.path().join("current.json");
    for (answers, report) in [(&perfect, &baseline), (&empty, &current)] {
        mockexam()
            .arg("score")
            .arg("--exam")
            .arg(&exam)
            .arg("--answers")
            .arg(answers)
            .arg("--save")
            .arg(report)
            .assert()
            .success();
    }

    mockexam()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 regressions"));

    mockexam()
        .arg("compare")
        .arg("--baseline")
        .arg(&baseline)
        .arg("--current")
        .arg(&current)
        .arg("--fail-on-regression")
        .assert()
        .failure();

    mockexam()
        .arg("compare")
        .arg("--baseline")
        .arg(&current)
        .arg("--current")
        .arg(&baseline)
        .arg("--format")
        .arg("markdown")
        .arg("--fail-on-regression")
        .assert()
        .success()
        .stdout(predicate::str::contains("### Improvements"));
}

#[test]
fn compare_nonexistent_report() {
    mockexam()
        .arg("compare")
        .arg("--baseline")
        .arg("no_such_file.json")
        .arg("--current")
        .arg("also_no_file.json")
        .assert()
        .failure();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created mockexam.toml"))
        .stdout(predicate::str::contains("Created templates/example.toml"))
        .stdout(predicate::str::contains("Created pools/example.json"));

    assert!(dir.path().join("mockexam.toml").exists());
    assert!(dir.path().join("templates/example.toml").exists());
    assert!(dir.path().join("pools/example.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_scaffold_is_usable() {
    let dir = TempDir::new().unwrap();

    mockexam()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    mockexam()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--template")
        .arg("templates/example.toml")
        .arg("--pool")
        .arg("pools/example.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("All templates valid"));

    mockexam()
        .current_dir(dir.path())
        .arg("generate")
        .arg("--template")
        .arg("demo-mini")
        .arg("--pool")
        .arg("pools/example.json")
        .arg("--seed")
        .arg("scaffold")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"demo-mini\""));
}
