//! The `mockexam init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("mockexam.toml").exists() {
        println!("mockexam.toml already exists, skipping.");
    } else {
        std::fs::write("mockexam.toml", SAMPLE_CONFIG)?;
        println!("Created mockexam.toml");
    }

    write_once("templates", "templates/example.toml", EXAMPLE_TEMPLATE)?;
    write_once("pools", "pools/example.json", EXAMPLE_POOL)?;

    println!("\nNext steps:");
    println!("  1. Run: mockexam validate --template templates/example.toml --pool pools/example.json");
    println!("  2. Run: mockexam generate --template demo-mini --pool pools/example.json --output exam.json");
    println!("  3. Answer the exam in answers.json, then run: mockexam score --exam exam.json --answers answers.json");

    Ok(())
}

fn write_once(dir: &str, path: &str, content: &str) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mockexam configuration

templates_dir = "templates"
output_dir = "./mockexam-results"
weak_area_limit = 3
"#;

const EXAMPLE_TEMPLATE: &str = r#"[template]
id = "demo-mini"
name = "Demo Mini Exam"
certification = "DEMO"
section = "MINI"
total_questions = 12
time_limit_minutes = 20
passing_score = 70

[template.difficulty]
easy = 30
medium = 50
hard = 20

[template.scale]
type = "percent"

[[blueprint]]
area = "DEMO-I"
name = "Foundations"
weight = 40

[[blueprint]]
area = "DEMO-II"
name = "Applications"
weight = 35

[[blueprint]]
area = "DEMO-III"
name = "Ethics"
weight = 25
"#;

const EXAMPLE_POOL: &str = r#"[
  {
    "id": "demo-i-01",
    "blueprint_area": "DEMO-I-A",
    "topic": "Foundations topic 1",
    "difficulty": "easy",
    "prompt": "Foundations sample question 1?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-02",
    "blueprint_area": "DEMO-I-B",
    "topic": "Foundations topic 2",
    "difficulty": "medium",
    "prompt": "Foundations sample question 2?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-03",
    "blueprint_area": "DEMO-I-A",
    "topic": "Foundations topic 3",
    "difficulty": "hard",
    "prompt": "Foundations sample question 3?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-04",
    "blueprint_area": "DEMO-I-B",
    "topic": "Foundations topic 1",
    "difficulty": "easy",
    "prompt": "Foundations sample question 4?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-05",
    "blueprint_area": "DEMO-I-A",
    "topic": "Foundations topic 2",
    "difficulty": "medium",
    "prompt": "Foundations sample question 5?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-06",
    "blueprint_area": "DEMO-I-B",
    "topic": "Foundations topic 3",
    "difficulty": "hard",
    "prompt": "Foundations sample question 6?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-07",
    "blueprint_area": "DEMO-I-A",
    "topic": "Foundations topic 1",
    "difficulty": "easy",
    "prompt": "Foundations sample question 7?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-08",
    "blueprint_area": "DEMO-I-B",
    "topic": "Foundations topic 2",
    "difficulty": "medium",
    "prompt": "Foundations sample question 8?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-i-09",
    "blueprint_area": "DEMO-I-A",
    "topic": "Foundations topic 3",
    "difficulty": "hard",
    "prompt": "Foundations sample question 9?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-01",
    "blueprint_area": "DEMO-II-A",
    "topic": "Applications topic 1",
    "difficulty": "easy",
    "prompt": "Applications sample question 1?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-02",
    "blueprint_area": "DEMO-II-B",
    "topic": "Applications topic 2",
    "difficulty": "medium",
    "prompt": "Applications sample question 2?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-03",
    "blueprint_area": "DEMO-II-A",
    "topic": "Applications topic 3",
    "difficulty": "hard",
    "prompt": "Applications sample question 3?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-04",
    "blueprint_area": "DEMO-II-B",
    "topic": "Applications topic 1",
    "difficulty": "easy",
    "prompt": "Applications sample question 4?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-05",
    "blueprint_area": "DEMO-II-A",
    "topic": "Applications topic 2",
    "difficulty": "medium",
    "prompt": "Applications sample question 5?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-06",
    "blueprint_area": "DEMO-II-B",
    "topic": "Applications topic 3",
    "difficulty": "hard",
    "prompt": "Applications sample question 6?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-07",
    "blueprint_area": "DEMO-II-A",
    "topic": "Applications topic 1",
    "difficulty": "easy",
    "prompt": "Applications sample question 7?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-08",
    "blueprint_area": "DEMO-II-B",
    "topic": "Applications topic 2",
    "difficulty": "medium",
    "prompt": "Applications sample question 8?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-ii-09",
    "blueprint_area": "DEMO-II-A",
    "topic": "Applications topic 3",
    "difficulty": "hard",
    "prompt": "Applications sample question 9?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-01",
    "blueprint_area": "DEMO-III-A",
    "topic": "Ethics topic 1",
    "difficulty": "easy",
    "prompt": "Ethics sample question 1?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-02",
    "blueprint_area": "DEMO-III-B",
    "topic": "Ethics topic 2",
    "difficulty": "medium",
    "prompt": "Ethics sample question 2?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-03",
    "blueprint_area": "DEMO-III-A",
    "topic": "Ethics topic 3",
    "difficulty": "hard",
    "prompt": "Ethics sample question 3?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-04",
    "blueprint_area": "DEMO-III-B",
    "topic": "Ethics topic 1",
    "difficulty": "easy",
    "prompt": "Ethics sample question 4?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-05",
    "blueprint_area": "DEMO-III-A",
    "topic": "Ethics topic 2",
    "difficulty": "medium",
    "prompt": "Ethics sample question 5?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-06",
    "blueprint_area": "DEMO-III-B",
    "topic": "Ethics topic 3",
    "difficulty": "hard",
    "prompt": "Ethics sample question 6?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 1,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-07",
    "blueprint_area": "DEMO-III-A",
    "topic": "Ethics topic 1",
    "difficulty": "easy",
    "prompt": "Ethics sample question 7?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 2,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-08",
    "blueprint_area": "DEMO-III-B",
    "topic": "Ethics topic 2",
    "difficulty": "medium",
    "prompt": "Ethics sample question 8?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 3,
    "explanation": "Replace with a real explanation."
  },
  {
    "id": "demo-iii-09",
    "blueprint_area": "DEMO-III-A",
    "topic": "Ethics topic 3",
    "difficulty": "hard",
    "prompt": "Ethics sample question 9?",
    "options": [
      "Option A",
      "Option B",
      "Option C",
      "Option D"
    ],
    "correct_option": 0,
    "explanation": "Replace with a real explanation."
  }
]
"#;
