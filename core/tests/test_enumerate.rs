// Option-space enumeration and run planning.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use smash_core::bench::{all_options, describe_options, plan};
    use smash_core::compression::{
        boxed, CodecError, CodecRegistry, CompressedBound, CompressionEngine, Compressor,
        Decompressor, ParameterInfo,
    };
    use smash_core::options::Options;
    use smash_core::smash::Smash;

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------
    fn count(library: &str) -> usize {
        all_options(&Smash::new(library).unwrap(), Options::recommended()).len()
    }

    /// Engine exposing only a work factor, to check the stepped walk.
    #[derive(Default)]
    struct Sorter;

    struct Noop;

    impl Compressor for Noop {
        fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
            output[..input.len()].copy_from_slice(input);
            Ok(input.len())
        }
    }

    impl Decompressor for Noop {
        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
            output[..input.len()].copy_from_slice(input);
            Ok(input.len())
        }
    }

    impl CompressionEngine for Sorter {
        fn name(&self) -> &'static str {
            "sorter"
        }

        fn work_factor_info(&self) -> ParameterInfo {
            ParameterInfo::range(0, 250)
        }

        fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
            CompressedBound::Exact(uncompressed)
        }

        fn create_compressor(&self, _options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
            Ok(Box::new(Noop))
        }

        fn create_decompressor(&self, _options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
            Ok(Box::new(Noop))
        }
    }

    // ------------------------------------------------------------
    // Enumeration
    // ------------------------------------------------------------
    #[test]
    fn engine_without_parameters_yields_the_base() {
        let smash = Smash::new("copy").unwrap();
        let base = Options::recommended();
        assert_eq!(all_options(&smash, base), vec![base]);
        assert_eq!(count("lz4flex"), 1);
    }

    #[test]
    fn option_space_sizes() {
        // level 0 has a single mode, levels 1-12 have two
        assert_eq!(count("lz4"), 1 + 12 * 2);
        assert_eq!(count("deflate"), 10 * 3);
        assert_eq!(count("zstd"), 22 * 18 * 3 * 4);
    }

    #[test]
    fn every_enumerated_combination_is_valid_and_unique() {
        for library in ["lz4", "deflate", "zstd"] {
            let smash = Smash::new(library).unwrap();
            let all = all_options(&smash, Options::recommended());
            let unique: HashSet<Options> = all.iter().copied().collect();
            assert_eq!(unique.len(), all.len(), "{library}");
            assert!(all.iter().all(|o| smash.check_options(o, true)), "{library}");
        }
    }

    #[test]
    fn mode_follows_level() {
        let smash = Smash::new("lz4").unwrap();
        let all = all_options(&smash, Options::recommended());
        assert_eq!((all[0].compression_level(), all[0].mode()), (0, 0));
        assert_eq!((all[1].compression_level(), all[1].mode()), (1, 0));
        assert_eq!((all[2].compression_level(), all[2].mode()), (1, 1));
        assert_eq!((all[3].compression_level(), all[3].mode()), (2, 0));
        assert!(all.iter().all(|o| o.mode() <= 1));
    }

    #[test]
    fn unsupported_fields_keep_base_values() {
        let smash = Smash::new("deflate").unwrap();
        let base = Options::recommended().with_window_size(15).with_number_threads(3);
        for o in all_options(&smash, base) {
            assert_eq!(o.window_size(), 15);
            assert_eq!(o.number_threads(), 3);
        }
    }

    #[test]
    fn work_factor_walks_in_steps() {
        let mut registry = CodecRegistry::empty();
        registry.register("sorter", boxed::<Sorter>);
        let smash = Smash::with_registry(&registry, "sorter").unwrap();

        let factors: Vec<u8> = all_options(&smash, Options::new())
            .iter()
            .map(|o| o.work_factor())
            .collect();
        assert_eq!(factors, vec![0, 50, 100, 150, 200, 250]);
    }

    // ------------------------------------------------------------
    // Planning
    // ------------------------------------------------------------
    #[test]
    fn plan_single_library_uses_given_options() {
        let registry = CodecRegistry::builtin();
        let options = Options::recommended().with_compression_level(5);
        let configurations = plan(&registry, "zstd", options, false).unwrap();
        assert_eq!(configurations.len(), 1);
        assert_eq!(configurations[0].library, "zstd");
        assert_eq!(configurations[0].options, options);
    }

    #[test]
    fn plan_all_follows_registry_order() {
        let registry = CodecRegistry::builtin();
        let configurations = plan(&registry, "all", Options::recommended(), false).unwrap();
        let names: Vec<&str> = configurations.iter().map(|c| c.library.as_str()).collect();
        assert_eq!(names, ["copy", "deflate", "lz4", "lz4flex", "zstd"]);

        let exhaustive = plan(&registry, "all", Options::recommended(), true).unwrap();
        assert_eq!(exhaustive.len(), 1 + 30 + 25 + 1 + 4752);
    }

    #[test]
    fn plan_rejects_unknown_library() {
        let err = plan(&CodecRegistry::builtin(), "brotli", Options::new(), false).unwrap_err();
        assert!(matches!(err, CodecError::UnknownLibrary { .. }));
    }

    #[test]
    fn describe_lists_supported_parameters() {
        let zstd = Smash::new("zstd").unwrap();
        let options = Options::recommended()
            .with_compression_level(3)
            .with_window_size(20);
        assert_eq!(
            describe_options(&zstd, &options),
            "zstd level=3 window=20 shuffle=none threads=1"
        );

        let lz4 = Smash::new("lz4").unwrap();
        let options = Options::new().with_compression_level(4).with_mode(1);
        assert_eq!(describe_options(&lz4, &options), "lz4 level=4 mode=high");

        assert_eq!(describe_options(&Smash::new("copy").unwrap(), &options), "copy");
    }
}
