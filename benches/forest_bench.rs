use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dlgs::comment::Admitted;
use dlgs::forest::{Extractor, ExtractorBuilder, Forest, Mode};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// `nb_submissions` random reply trees of `per_submission` comments each.
fn random_comments(nb_submissions: usize, per_submission: usize) -> Vec<Admitted> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut comments = Vec::with_capacity(nb_submissions * per_submission);
    for s in 0..nb_submissions {
        let submission_id = format!("s{s}");
        for c in 0..per_submission {
            let parent_id = if c == 0 || rng.gen_bool(0.1) {
                submission_id.clone()
            } else {
                format!("{s}_{}", rng.gen_range(0..c))
            };
            comments.push(Admitted {
                content: format!("comment {c} of submission {s}"),
                id: format!("{s}_{c}"),
                submission_id: submission_id.clone(),
                parent_id,
                subreddit: "bench".to_string(),
            });
        }
    }
    comments
}

fn bench_forest(c: &mut Criterion) {
    let mut group = c.benchmark_group("Forest");
    for size in [10, 100, 1000] {
        let comments = random_comments(100, size);
        group.bench_with_input(BenchmarkId::new("build", size), &comments, |b, comments| {
            b.iter(|| Forest::from_admitted(black_box(comments.clone())))
        });

        for mode in [Mode::Context, Mode::Domain] {
            let config = ExtractorBuilder::default().mode(mode).build_or_default();
            group.bench_with_input(
                BenchmarkId::new(format!("build+extract {mode:?}"), size),
                &comments,
                |b, comments| {
                    b.iter(|| {
                        let forest = Forest::from_admitted(comments.clone());
                        Extractor::new(forest, config.clone()).count()
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_forest);
criterion_main!(benches);
