use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chrono::Utc;
use intervue_core::evaluator::evaluate;
use intervue_core::model::{Answer, Difficulty, Question, SubmitTrigger};
use intervue_core::statistics::final_score;
use intervue_core::text::normalize;

fn keywords(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("concept{i}")).collect()
}

fn long_answer(words: usize) -> String {
    (0..words)
        .map(|i| {
            if i % 7 == 0 {
                format!("Concept{}!", i % 12)
            } else {
                "filler".to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let kw = keywords(5);
    let short = "Concept0 and concept3, briefly.";
    group.bench_function("short_answer_5_keywords", |b| {
        b.iter(|| evaluate(black_box(short), black_box(&kw), black_box(10.0)))
    });

    let kw = keywords(20);
    let long = long_answer(400);
    group.bench_function("long_answer_20_keywords", |b| {
        b.iter(|| evaluate(black_box(&long), black_box(&kw), black_box(10.0)))
    });

    group.bench_function("normalize_400_words", |b| {
        b.iter(|| normalize(black_box(&long)))
    });

    group.finish();
}

fn bench_final_score(c: &mut Criterion) {
    let questions: Vec<Question> = Difficulty::ALL
        .iter()
        .flat_map(|&difficulty| {
            (0..2).map(move |i| Question {
                id: format!("{difficulty}-{i}"),
                difficulty,
                text: String::new(),
                keywords: vec!["k".into()],
                max_score: 10.0,
            })
        })
        .collect();
    let answers: Vec<Answer> = questions
        .iter()
        .enumerate()
        .map(|(i, q)| Answer {
            question_id: q.id.clone(),
            raw_text: String::new(),
            matched_keywords: vec![],
            score: i as f64,
            trigger: SubmitTrigger::Manual,
            submitted_at: Utc::now(),
        })
        .collect();

    c.bench_function("final_score_6_answers", |b| {
        b.iter(|| final_score(black_box(&answers), black_box(&questions)))
    });
}

criterion_group!(benches, bench_evaluate, bench_final_score);
criterion_main!(benches);
