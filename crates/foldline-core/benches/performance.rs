use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use foldline_core::{
    Command, CommandExecutor, Document, EditCommand, EditorConfig, FoldCommand, FoldEngine,
    IndentConfig, Projection, SelectionTranslator,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 48);
    for i in 0..line_count {
        let depth = match i % 8 {
            0 => 0,
            1 | 7 => 1,
            2 | 6 => 2,
            _ => 3,
        };
        out.push_str(&"    ".repeat(depth));
        out.push_str(&format!("stmt_{i:06}(alpha, beta, gamma)\n"));
    }
    // Remove the final '\n' to avoid creating an extra trailing empty line.
    out.pop();
    out
}

fn bench_detect_regions(c: &mut Criterion) {
    let document = Document::new(&large_text(50_000));
    c.bench_function("detect_regions/50k_lines", |b| {
        b.iter(|| {
            let folding = FoldEngine::new(black_box(&document), IndentConfig::default(), 10);
            black_box(folding.regions().len());
        })
    });
}

fn bench_projection_fold_all(c: &mut Criterion) {
    let document = Document::new(&large_text(50_000));
    let mut folding = FoldEngine::new(&document, IndentConfig::default(), 10);
    folding.fold_all();

    c.bench_function("projection_build/fold_all_50k_lines", |b| {
        b.iter(|| {
            let projection = Projection::build(&document, folding.folded(), folding.regions());
            black_box(projection.line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || {
                let mut executor = CommandExecutor::new(&text, EditorConfig::default());
                let middle = executor.core().projection().char_len() / 2;
                executor.execute(Command::Edit(EditCommand::SetSelection {
                    start: middle,
                    end: middle,
                }));
                executor
            },
            |mut executor| {
                for _ in 0..100 {
                    executor.execute(Command::Edit(EditCommand::InsertText {
                        text: "x".to_string(),
                    }));
                }
                black_box(executor.core().document().char_len());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_translation_round_trip(c: &mut Criterion) {
    let mut executor = CommandExecutor::new(&large_text(50_000), EditorConfig::default());
    executor.execute(Command::Fold(FoldCommand::FoldAll));
    let core = executor.core();
    let translator = SelectionTranslator::new(core.document(), core.projection());
    let len = core.projection().char_len();

    c.bench_function("translate_round_trip/1k_offsets", |b| {
        b.iter(|| {
            for step in 0..1_000 {
                let projected = step * len / 1_000;
                let logical = translator.projected_to_logical(black_box(projected));
                black_box(translator.logical_to_projected(logical));
            }
        })
    });
}

criterion_group!(
    benches,
    bench_detect_regions,
    bench_projection_fold_all,
    bench_typing_in_middle,
    bench_translation_round_trip
);
criterion_main!(benches);
