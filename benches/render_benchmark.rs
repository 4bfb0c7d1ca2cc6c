//! Benchmarks for examdocx rendering performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks lay out and package synthetic papers of various sizes.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use examdocx::{
    ContentTree, McqOption, MemoryAssetStore, Node, Paper, PaperHeader, Question, RenderOptions,
};

/// Creates a paper with `count` questions cycling through text, MCQ, and table kinds.
fn create_test_paper(count: usize) -> Paper {
    let mut paper = Paper::new().with_header(PaperHeader::titled("Benchmark Paper"));

    for i in 0..count {
        let question = match i % 3 {
            0 => Question::text(ContentTree::from_text(format!(
                "Question {} - explain the benchmark test content in detail.",
                i + 1
            ))),
            1 => Question::mcq(
                ContentTree::from_text(format!("Question {}: pick one.", i + 1)),
                ["alpha", "beta", "gamma", "delta"]
                    .iter()
                    .enumerate()
                    .map(|(j, t)| McqOption::new(examdocx::model::option_label(j), *t))
                    .collect(),
            )
            .set_correct_option(i % 4)
            .expect("four options"),
            _ => Question::table(ContentTree::new(Node::doc(vec![Node::table(
                (0..4)
                    .map(|r| {
                        Node::row(
                            (0..3)
                                .map(|c| {
                                    Node::cell(vec![Node::paragraph(vec![Node::text(format!(
                                        "r{}c{}",
                                        r, c
                                    ))])])
                                })
                                .collect(),
                        )
                    })
                    .collect(),
            )]))),
        };
        let section = format!("Section {}", i / 10 + 1);
        paper = paper
            .push_question(question.with_section(section))
            .expect("unique ids");
    }

    paper
}

/// Benchmark layout only.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let assets = MemoryAssetStore::new();

    for count in [10, 50, 200].iter() {
        let paper = create_test_paper(*count);
        group.bench_function(format!("{}_questions", count), |b| {
            b.iter(|| {
                examdocx::render::render(black_box(&paper), &RenderOptions::default(), &assets)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark layout plus packaging.
fn bench_docx(c: &mut Criterion) {
    let mut group = c.benchmark_group("docx");
    let assets = MemoryAssetStore::new();

    for count in [10, 50, 200].iter() {
        let paper = create_test_paper(*count);
        group.bench_function(format!("{}_questions", count), |b| {
            b.iter(|| {
                examdocx::render::render_docx(black_box(&paper), &RenderOptions::default(), &assets)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Benchmark exporting the paper and answer key together.
fn bench_bundle(c: &mut Criterion) {
    let assets = MemoryAssetStore::new();
    let paper = create_test_paper(50);

    c.bench_function("bundle_50_questions", |b| {
        b.iter(|| {
            examdocx::export_bundle(black_box(&paper), &RenderOptions::default(), &assets).unwrap()
        });
    });
}

criterion_group!(benches, bench_layout, bench_docx, bench_bundle);
criterion_main!(benches);
