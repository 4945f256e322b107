// Trimmed statistics, per-trial throughput and result ranking.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use smash_core::options::Options;
    use smash_core::stats::{
        aggregate, kept_count, select_best, trimmed_estimate, BenchResult, Estimate, RankKey,
        SampleSet, StatsError, Summary,
    };
    use smash_core::telemetry::{throughput, Stage, StageTimes, TrialSnapshot, TrialTimer};

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn estimate(mean: f64) -> Estimate {
        Estimate {
            mean,
            std_dev: 0.0,
            kept: 1,
            count: 1,
        }
    }

    fn result(library: &str, compressed_size: u64, total: f64, compression: Option<f64>) -> BenchResult {
        BenchResult {
            summary: library.to_string(),
            library: library.to_string(),
            options: Options::new(),
            original_size: 1000,
            compressed_size,
            throughput: Summary {
                compression: compression.map(estimate),
                transfer: None,
                decompression: None,
                total: estimate(total),
            },
        }
    }

    fn sequential_times(compress_ms: u64, transfer_ms: u64, decompress_ms: u64) -> StageTimes {
        let mut times = StageTimes::default();
        times.add(Stage::Compress, Duration::from_millis(compress_ms));
        times.add(Stage::Transfer, Duration::from_millis(transfer_ms));
        times.add(Stage::Decompress, Duration::from_millis(decompress_ms));
        times
    }

    // ------------------------------------------------------------
    // Trimmed estimate
    // ------------------------------------------------------------
    #[test]
    fn kept_count_discards_slowest_sixth() {
        assert_eq!(kept_count(1), 1);
        assert_eq!(kept_count(2), 2);
        assert_eq!(kept_count(5), 5);
        assert_eq!(kept_count(6), 5);
        assert_eq!(kept_count(10), 9);
        assert_eq!(kept_count(12), 10);
    }

    #[test]
    fn mean_and_population_deviation() {
        let e = trimmed_estimate(&[30.0, 10.0, 50.0, 20.0, 40.0]).unwrap();
        assert_eq!(e.kept, 5);
        assert_eq!(e.count, 5);
        assert!(close(e.mean, 30.0));
        assert!(close(e.std_dev, 200f64.sqrt()));
    }

    #[test]
    fn slowest_sample_is_dropped() {
        // six samples keep five; the 1.0 outlier goes
        let e = trimmed_estimate(&[100.0, 1.0, 100.0, 100.0, 100.0, 100.0]).unwrap();
        assert_eq!(e.kept, 5);
        assert!(close(e.mean, 100.0));
        assert!(close(e.std_dev, 0.0));
    }

    #[test]
    fn empty_series_is_an_error() {
        assert_eq!(trimmed_estimate(&[]), Err(StatsError::NoSamples));
        assert_eq!(aggregate(&SampleSet::sequential()), Err(StatsError::NoSamples));
    }

    // ------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------
    #[test]
    fn stage_throughputs_use_the_right_byte_counts() {
        let snap = TrialSnapshot::from_stage_times(2_000_000, 500_000, sequential_times(1000, 500, 250));

        assert!(close(snap.compression_mbps.unwrap(), 2.0));
        assert!(close(snap.transfer_mbps.unwrap(), 1.0));
        assert!(close(snap.decompression_mbps.unwrap(), 2.0));
        // 2 MB over 1.75 s
        assert!(close(snap.total_mbps, 2.0 / 1.75));
        assert!(close(snap.compression_ratio(), 4.0));
    }

    #[test]
    fn pipelined_snapshot_has_total_only() {
        let mut times = StageTimes::default();
        times.add(Stage::Total, Duration::from_millis(500));
        let snap = TrialSnapshot::from_stage_times(1_000_000, 10, times);

        assert_eq!(snap.compression_mbps, None);
        assert_eq!(snap.transfer_mbps, None);
        assert_eq!(snap.decompression_mbps, None);
        assert!(close(snap.total_mbps, 2.0));
    }

    #[test]
    fn zero_duration_stays_finite() {
        let t = throughput(1_000_000, 0.0);
        assert!(t.is_finite());
        assert!(t > 0.0);
    }

    #[test]
    fn timer_charges_stages_and_tracks_wall_time() {
        let mut timer = TrialTimer::new();
        let value = timer.time(Stage::Compress, || {
            std::thread::sleep(Duration::from_millis(5));
            42
        });
        assert_eq!(value, 42);
        assert!(timer.elapsed() >= timer.stage_times.get(Stage::Compress));

        timer.add_stage_time(Stage::Total, timer.elapsed());
        let times = timer.into_stage_times();
        assert!(times.get(Stage::Compress) >= Duration::from_millis(5));
        assert!(times.get(Stage::Total) >= times.get(Stage::Compress));
        assert!(!times.contains(Stage::Transfer));
        assert_eq!(times.total(), times.get(Stage::Total));
    }

    // ------------------------------------------------------------
    // Aggregation
    // ------------------------------------------------------------
    #[test]
    fn sequential_aggregate_covers_every_stage() {
        let mut samples = SampleSet::sequential();
        for ms in [100, 200, 400] {
            samples.record(&TrialSnapshot::from_stage_times(1_000_000, 1_000_000, sequential_times(ms, ms, ms)));
        }
        assert_eq!(samples.len(), 3);

        let summary = aggregate(&samples).unwrap();
        let compression = summary.compression.unwrap();
        assert_eq!(compression.count, 3);
        assert!(close(compression.mean, (10.0 + 5.0 + 2.5) / 3.0));
        assert!(summary.transfer.is_some());
        assert!(summary.decompression.is_some());
        assert_eq!(summary.total.count, 3);
    }

    #[test]
    fn pipelined_aggregate_has_no_stage_estimates() {
        let mut samples = SampleSet::pipelined();
        samples.record(&TrialSnapshot::from_stage_times(1_000_000, 1_000, sequential_times(10, 10, 10)));
        samples.record(&TrialSnapshot::from_stage_times(1_000_000, 1_000, sequential_times(20, 20, 20)));
        assert!(samples.is_pipelined());

        let summary = aggregate(&samples).unwrap();
        assert_eq!(summary.compression, None);
        assert_eq!(summary.transfer, None);
        assert_eq!(summary.decompression, None);
        assert_eq!(summary.total.count, 2);
    }

    // ------------------------------------------------------------
    // Ranking
    // ------------------------------------------------------------
    #[test]
    fn none_keeps_insertion_order() {
        let results = vec![result("a", 500, 1.0, None), result("b", 100, 9.0, None)];
        let kept = select_best(results, RankKey::None, 1);
        let names: Vec<&str> = kept.iter().map(|r| r.library.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let results = vec![
            result("a", 500, 1.0, None),
            result("b", 100, 9.0, None),
            result("c", 250, 5.0, None),
        ];

        let by_ratio = select_best(results.clone(), RankKey::Ratio, 2);
        let names: Vec<&str> = by_ratio.iter().map(|r| r.library.as_str()).collect();
        assert_eq!(names, ["b", "c"]);

        let by_total = select_best(results, RankKey::Total, 0);
        let names: Vec<&str> = by_total.iter().map(|r| r.library.as_str()).collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn missing_metric_ranks_last_and_ties_are_stable() {
        let results = vec![
            result("none", 100, 1.0, None),
            result("slow", 100, 1.0, Some(2.0)),
            result("fast", 100, 1.0, Some(8.0)),
            result("fast2", 100, 1.0, Some(8.0)),
        ];
        let ranked = select_best(results, RankKey::Compression, 0);
        let names: Vec<&str> = ranked.iter().map(|r| r.library.as_str()).collect();
        assert_eq!(names, ["fast", "fast2", "slow", "none"]);
    }

    #[test]
    fn rank_key_travels_as_one_byte() {
        for key in RankKey::ALL {
            let byte: u8 = key.into();
            assert_eq!(RankKey::try_from(byte).unwrap(), key);
            assert_eq!(RankKey::from_name(key.name()), Some(key));
        }
        assert!(RankKey::try_from(6u8).is_err());
        assert!(RankKey::try_from(255u8).is_err());
        assert_eq!(RankKey::default(), RankKey::None);
    }

    #[test]
    fn result_serializes_to_json() {
        let value = serde_json::to_value(result("zstd", 250, 3.5, Some(7.0))).unwrap();
        assert_eq!(value["library"], "zstd");
        assert_eq!(value["compressed_size"], 250);
        assert_eq!(value["throughput"]["compression"]["mean"], 7.0);
        assert!(value["throughput"]["transfer"].is_null());
    }
}
