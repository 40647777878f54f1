//! Built-in exam templates.
//!
//! CPA multiple-choice sections follow the AICPA 2025/2026 blueprints and
//! the CFP exams follow the CFP Board principal knowledge domains. All of
//! them report on the percent scale; supply a template file with its own
//! `[template.scale]` for a certification-specific reporting scale.

use crate::model::{
    BlueprintWeight, Difficulty, DifficultyDistribution, ExamTemplateConfig, TestletConfig,
};
use crate::scale::ScoreScale;

const CPA_PASSING_SCORE: f64 = 75.0;
const CPA_TIME_LIMIT_MINUTES: u32 = 240;

const CFP_PASSING_SCORE: f64 = 70.0;

type Area = (&'static str, &'static str, f64);

const FAR: &[Area] = &[
    ("FAR-I", "Conceptual Framework, Standards, and Regulation", 25.0),
    ("FAR-II", "Select Financial Statement Accounts", 30.0),
    ("FAR-III", "Select Transactions", 25.0),
    ("FAR-IV", "State and Local Governments", 10.0),
    ("FAR-V", "Not-for-Profit Entities", 10.0),
];

const AUD: &[Area] = &[
    ("AUD-I", "Ethics, Independence, and Professional Conduct", 15.0),
    ("AUD-II", "Assessing Risk and Developing a Planned Response", 25.0),
    ("AUD-III", "Performing Further Procedures and Obtaining Evidence", 30.0),
    ("AUD-IV", "Forming Conclusions and Reporting", 20.0),
    ("AUD-V", "Accounting and Review Services", 10.0),
];

const REG: &[Area] = &[
    ("REG-I", "Ethics, Professional Responsibilities, and Federal Tax Procedures", 10.0),
    ("REG-II", "Business Law", 15.0),
    ("REG-III", "Federal Taxation of Property Transactions", 12.0),
    ("REG-IV", "Federal Taxation of Individuals", 22.0),
    ("REG-V", "Federal Taxation of Entities", 28.0),
    ("REG-VI", "Federal Taxation of Property", 13.0),
];

const BAR: &[Area] = &[
    ("BAR-I", "Business Analysis", 35.0),
    ("BAR-II", "Technical Accounting and Reporting", 40.0),
    ("BAR-III", "State and Local Government Concepts", 15.0),
    ("BAR-IV", "Not-for-Profit Concepts", 10.0),
];

const ISC: &[Area] = &[
    ("ISC-I", "Information Systems and Data Management", 35.0),
    ("ISC-II", "Security, Confidentiality, and Privacy", 35.0),
    ("ISC-III", "Considerations for System and Organization Controls (SOC) Engagements", 30.0),
];

const TCP: &[Area] = &[
    ("TCP-I", "Tax Compliance and Planning for Individuals and Personal Financial Planning", 30.0),
    ("TCP-II", "Entity Tax Compliance", 30.0),
    ("TCP-III", "Entity Tax Planning", 20.0),
    ("TCP-IV", "Property Transactions - Loss and Deferral", 10.0),
    ("TCP-V", "Wealth Transfer and Estate Planning", 10.0),
];

const CFP: &[Area] = &[
    ("RET", "Retirement Planning", 18.0),
    ("INV", "Investment Planning", 17.0),
    ("GEN", "General Principles", 15.0),
    ("TAX", "Tax Planning", 14.0),
    ("RIS", "Risk Management", 11.0),
    ("EST", "Estate Planning", 10.0),
    ("PRO", "Professional Conduct", 8.0),
    ("PSY", "Psychology of Financial Planning", 7.0),
];

fn blueprint(areas: &[Area]) -> Vec<BlueprintWeight> {
    areas
        .iter()
        .map(|(area, name, weight)| BlueprintWeight::new(*area, *weight).named(*name))
        .collect()
}

fn cpa_section(section: &str, total_questions: u32, areas: &[Area]) -> ExamTemplateConfig {
    ExamTemplateConfig {
        id: format!("cpa-{}-mcq", section.to_lowercase()),
        name: format!("CPA {section} Multiple Choice"),
        certification: "CPA".into(),
        section: section.into(),
        total_questions,
        time_limit_minutes: CPA_TIME_LIMIT_MINUTES,
        passing_score: CPA_PASSING_SCORE,
        blueprint: blueprint(areas),
        difficulty: DifficultyDistribution::default(),
        scale: ScoreScale::Percent,
        testlets: Vec::new(),
        item_sets: Vec::new(),
    }
}

fn cfp_exam(id: &str, name: &str, total_questions: u32, minutes: u32) -> ExamTemplateConfig {
    ExamTemplateConfig {
        id: id.into(),
        name: name.into(),
        certification: "CFP".into(),
        section: String::new(),
        total_questions,
        time_limit_minutes: minutes,
        passing_score: CFP_PASSING_SCORE,
        blueprint: blueprint(CFP),
        difficulty: DifficultyDistribution::default(),
        scale: ScoreScale::Percent,
        testlets: Vec::new(),
        item_sets: Vec::new(),
    }
}

fn testlet(
    id: &str,
    name: &str,
    question_count: u32,
    areas: &[&str],
    difficulties: &[Difficulty],
) -> TestletConfig {
    let mut testlet = TestletConfig::new(id, question_count);
    testlet.name = name.into();
    testlet.time_limit_minutes = CPA_TIME_LIMIT_MINUTES / 4;
    testlet.areas = areas.iter().map(|a| a.to_string()).collect();
    testlet.difficulties = difficulties.to_vec();
    testlet
}

/// FAR in two MCQ testlets: a moderate first testlet on framework and
/// accounts, then a harder one on transactions and public sector topics.
fn far_mock() -> ExamTemplateConfig {
    let mut template = cpa_section("FAR", 66, FAR);
    template.id = "cpa-far-mock".into();
    template.name = "CPA FAR Mock Exam".into();
    template.testlets = vec![
        testlet(
            "far-t1",
            "Testlet 1",
            33,
            &["FAR-I", "FAR-II"],
            &[Difficulty::Easy, Difficulty::Medium],
        ),
        testlet(
            "far-t2",
            "Testlet 2",
            33,
            &["FAR-III", "FAR-IV", "FAR-V"],
            &[Difficulty::Medium, Difficulty::Hard],
        ),
    ];
    template
}

/// Every built-in template, CPA sections first.
pub fn builtin_templates() -> Vec<ExamTemplateConfig> {
    vec![
        cpa_section("FAR", 66, FAR),
        cpa_section("AUD", 72, AUD),
        cpa_section("REG", 72, REG),
        cpa_section("BAR", 66, BAR),
        cpa_section("ISC", 72, ISC),
        cpa_section("TCP", 72, TCP),
        far_mock(),
        cfp_exam("cfp-full", "CFP Full Mock Exam", 170, 180),
        cfp_exam("cfp-mini", "CFP Mini Mock Exam", 50, 60),
    ]
}

/// Look up a built-in template by id (case-insensitive).
pub fn find_template(id: &str) -> Option<ExamTemplateConfig> {
    builtin_templates()
        .into_iter()
        .find(|t| t.id.eq_ignore_ascii_case(id))
}
