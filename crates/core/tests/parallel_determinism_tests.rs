#![cfg(feature = "parallel")]

use rayon::ThreadPoolBuilder;
use revmark_core::{annotate_all, changed_identifiers, AnnotationEngine, DocumentPair};

fn run_in_pool<T>(threads: usize, f: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("build pool");
    pool.install(f)
}

fn chapters(count: usize) -> Vec<DocumentPair> {
    (0..count)
        .map(|i| {
            let old = (0..20)
                .map(|p| format!("<p>Chapter {i} paragraph {p} says the same thing.</p>"))
                .collect::<Vec<_>>()
                .join("\n");
            let new = (0..20)
                .map(|p| {
                    if (i + p) % 7 == 0 {
                        format!("<p>Chapter {i} paragraph {p} says something different now.</p>")
                    } else {
                        format!("<p>Chapter {i} paragraph {p} says the same thing.</p>")
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            let old = (i % 5 != 0).then_some(format!("<main>{old}</main>"));
            DocumentPair::new(format!("ch{i:02}"), old, format!("<main>{new}</main>"))
        })
        .collect()
}

#[test]
fn results_are_identical_across_thread_counts() {
    let engine = AnnotationEngine::default_config();
    let pairs = chapters(40);

    let results_1 = run_in_pool(1, || annotate_all(&engine, &pairs));
    let results_4 = run_in_pool(4, || annotate_all(&engine, &pairs));

    assert_eq!(results_1, results_4);
    assert_eq!(changed_identifiers(&results_1), changed_identifiers(&results_4));
}

#[test]
fn results_match_sequential_annotation() {
    let engine = AnnotationEngine::default_config();
    let pairs = chapters(12);

    let parallel = run_in_pool(3, || annotate_all(&engine, &pairs));

    for (pair, result) in pairs.iter().zip(&parallel) {
        assert_eq!(result.name, pair.name);
        assert_eq!(result.document, engine.annotate(pair.old.as_deref(), &pair.new));
    }
}
