use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use hamprep::engine::{BatchPolicy, SelectionEngine, build_options, pick_question};
use hamprep::pool::{Category, Question, QuestionId, QuestionPool};
use hamprep::store::CategoryProgress;

fn make_pool(count: u64) -> QuestionPool {
    let questions = (1..=count)
        .map(|n| Question {
            id: QuestionId::Number(n),
            prompt: format!("question {n}"),
            options: (0..4).map(|o| format!("option {n}.{o}")).collect(),
            correct_index: (n % 4) as usize,
            reference: None,
        })
        .collect();
    QuestionPool::new(Category::Extra, questions, true).unwrap()
}

fn bench_pick(c: &mut Criterion) {
    let pool = make_pool(1000);
    let mut progress = CategoryProgress {
        batch_index: 42,
        ..CategoryProgress::default()
    };
    progress.seen_ids = (421..=428).map(QuestionId::Number).collect();
    let window = hamprep::engine::batch_window(pool.len(), progress.batch_index);
    let mut rng = SmallRng::seed_from_u64(0);

    c.bench_function("pick_question (8 of 10 seen)", |b| {
        b.iter(|| pick_question(black_box(&pool), black_box(&progress), window.clone(), &mut rng))
    });
}

fn bench_select(c: &mut Criterion) {
    let pool = make_pool(1000);
    let engine = SelectionEngine::new(BatchPolicy::default());
    let mut rng = SmallRng::seed_from_u64(0);

    c.bench_function("select (fresh progress, 1000 questions)", |b| {
        b.iter(|| {
            let mut progress = CategoryProgress::default();
            engine.select(black_box(&pool), &mut progress, &mut rng)
        })
    });
}

fn bench_options(c: &mut Criterion) {
    let pool = make_pool(10);
    let question = pool.get(3).unwrap();
    let mut rng = SmallRng::seed_from_u64(0);

    c.bench_function("build_options (later pass)", |b| {
        b.iter(|| build_options(black_box(question), 2, &mut rng))
    });
}

criterion_group!(benches, bench_pick, bench_select, bench_options);
criterion_main!(benches);
