//! End-to-end pipeline tests: template -> pool -> exam -> answers -> result.
//!
//! These run the library the way the CLI does, using the sample templates
//! and pools shipped with the repository.

use std::collections::HashSet;
use std::path::Path;

use mockexam_core::catalog::find_template;
use mockexam_core::generator::{generate, GenerationWarning};
use mockexam_core::model::{AnswerMap, GeneratedExam};
use mockexam_core::parser::{load_question_pool, parse_template, validate_pool};
use mockexam_core::scale::ScaleTransform;
use mockexam_core::scorer::{score, MissReason};

fn far_exam(seed: &str) -> GeneratedExam {
    let template = parse_template(Path::new("../../templates/far-practice.toml")).unwrap();
    let pool = load_question_pool(Path::new("../../pools/far-practice.json")).unwrap();
    generate(&template, &pool, Some(seed)).unwrap()
}

fn answer_first_n_correctly(exam: &GeneratedExam, n: usize) -> AnswerMap {
    let mut answers = AnswerMap::new();
    for (i, q) in exam.questions.iter().enumerate() {
        if i < n {
            answers.select(&q.id, q.correct_option);
        } else {
            answers.select(&q.id, (q.correct_option + 1) % 4);
        }
    }
    answers
}

#[test]
fn sample_pool_satisfies_sample_template() {
    let template = parse_template(Path::new("../../templates/far-practice.toml")).unwrap();
    let pool = load_question_pool(Path::new("../../pools/far-practice.json")).unwrap();
    assert!(validate_pool(&template, &pool).is_empty());
}

#[test]
fn far_exam_follows_blueprint() {
    let exam = far_exam("pipeline");

    assert_eq!(exam.len(), 20);
    assert!(exam.warnings.is_empty(), "{:?}", exam.warnings);

    let counts = exam.count_by_area();
    assert_eq!(counts.get("FAR-I"), Some(&5));
    assert_eq!(counts.get("FAR-II"), Some(&6));
    assert_eq!(counts.get("FAR-III"), Some(&5));
    assert_eq!(counts.get("FAR-IV"), Some(&2));
    assert_eq!(counts.get("FAR-V"), Some(&2));

    let ids: HashSet<&str> = exam.question_ids().into_iter().collect();
    assert_eq!(ids.len(), 20);
}

#[test]
fn exam_survives_json_roundtrip() {
    let exam = far_exam("json");
    let json = serde_json::to_string(&exam).unwrap();
    let restored: GeneratedExam = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, exam);
}

#[test]
fn scoring_matches_answers() {
    let exam = far_exam("scoring");
    let answers = answer_first_n_correctly(&exam, 15);

    let result = score(&exam, &answers, exam.template.passing_score);

    assert_eq!(result.correct, 15);
    assert_eq!(result.answered, 20);
    assert_eq!(result.raw_percent, 75.0);
    assert_eq!(result.scaled_score, exam.template.scale.scale(75.0));
    assert_eq!(result.passed, result.scaled_score >= 75.0);
    assert_eq!(result.review.len(), 5);
    assert!(result
        .review
        .iter()
        .all(|r| matches!(r.reason, MissReason::Incorrect { .. })));
    assert!(result.review.windows(2).all(|w| w[0].position < w[1].position));

    let per_area: u32 = result.blueprint.iter().map(|p| p.questions).sum();
    assert_eq!(per_area, 20);
    for p in &result.blueprint {
        assert!((0.0..=100.0).contains(&p.accuracy));
    }
}

#[test]
fn catalog_template_with_thin_pool_degrades_gracefully() {
    let template = find_template("cpa-far-mcq").unwrap();
    let pool = load_question_pool(Path::new("../../pools/far-practice.json")).unwrap();

    let exam = generate(&template, &pool, Some("thin")).unwrap();

    assert_eq!(exam.len(), pool.len());
    assert!(exam
        .warnings
        .iter()
        .any(|w| matches!(w, GenerationWarning::AreaShortfall { area, .. } if area == "FAR-II")));
    assert!(exam.warnings.contains(&GenerationWarning::PoolExhausted {
        requested: 66,
        selected: 60
    }));

    let result = score(&exam, &AnswerMap::new(), template.passing_score);
    assert_eq!(result.review.len(), 60);
    assert!(!result.passed);
}

#[test]
fn capped_cfp_drill_respects_bounds() {
    let template = parse_template(Path::new("../../templates/cfp-drill.toml")).unwrap();
    let pool = load_question_pool(Path::new("../../pools/cfp-drill.json")).unwrap();

    for seed in ["a", "b", "c"] {
        let exam = generate(&template, &pool, Some(seed)).unwrap();
        let counts = exam.count_by_area();
        assert_eq!(exam.len(), 24);
        assert!(counts["RET"] <= 4);
        assert!(counts["INV"] <= 4);
        assert!(counts["PRO"] >= 2);
        assert!(counts["PSY"] >= 2);
    }
}
