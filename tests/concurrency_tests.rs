use revdrift::{available_parallelism, BatchScheduler, EngineConfig, InMemoryCorpus, SketchSize};

fn corpus(entities: usize) -> InMemoryCorpus {
    let docs: Vec<(String, Vec<(String, String)>)> = (0..entities)
        .map(|e| {
            let versions = (0..4)
                .map(|v| {
                    let label = if v == 0 { "C".to_string() } else { format!("C-{v}") };
                    let text = (0..60)
                        .map(|i| format!("t{}", (i * (v + 1) + e) % 17))
                        .collect::<Vec<_>>()
                        .join(" ");
                    (label, text)
                })
                .collect();
            (format!("entity_{e:03}"), versions)
        })
        .collect();
    InMemoryCorpus::from_map(docs)
}

fn engine() -> EngineConfig {
    EngineConfig::new()
        .with_shingle_widths([2, 5])
        .with_sketch_sizes([
            SketchSize::Bounded(4),
            SketchSize::Bounded(16),
            SketchSize::Unbounded,
        ])
}

#[test]
fn batch_size_never_changes_records() {
    let corpus = corpus(23);
    let baseline = BatchScheduler::new(engine().with_batch_size(23).with_workers(2))
        .unwrap()
        .run(&corpus)
        .unwrap();
    assert_eq!(baseline.records.len(), 23 * 3 * 2 * 3);

    for batch_size in [1, 2, 5, 10, 100] {
        let report = BatchScheduler::new(engine().with_batch_size(batch_size).with_workers(2))
            .unwrap()
            .run(&corpus)
            .unwrap();
        assert_eq!(report.records, baseline.records, "batch_size {batch_size}");
        assert_eq!(report.batches, 23usize.div_ceil(batch_size));
    }
}

#[test]
fn worker_count_never_changes_records() {
    let corpus = corpus(12);
    let baseline = BatchScheduler::new(engine().with_workers(1))
        .unwrap()
        .run(&corpus)
        .unwrap();
    for workers in [2, 3, available_parallelism()] {
        let report = BatchScheduler::new(engine().with_workers(workers))
            .unwrap()
            .run(&corpus)
            .unwrap();
        assert_eq!(report, baseline, "workers {workers}");
    }
}

#[test]
fn schedulers_run_concurrently_from_many_threads() {
    let corpus = corpus(8);
    let expected = BatchScheduler::new(engine().with_workers(1))
        .unwrap()
        .run(&corpus)
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    BatchScheduler::new(engine().with_workers(2))
                        .unwrap()
                        .run(&corpus)
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
