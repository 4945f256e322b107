// Registry and facade:
// * name resolution and `all` expansion
// * custom engine registration
// * capability introspection and information lines

#[cfg(test)]
mod tests {
    use smash_core::compression::{
        boxed, CodecError, CodecRegistry, CompressedBound, CompressionEngine, Compressor,
        Decompressor, Parameter, ParameterInfo, ParameterSet,
    };
    use smash_core::options::Options;
    use smash_core::smash::Smash;

    #[derive(Default)]
    struct Reverse;

    struct ReverseRole;

    impl Compressor for ReverseRole {
        fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
            for (dst, src) in output.iter_mut().zip(input.iter().rev()) {
                *dst = *src;
            }
            Ok(input.len())
        }
    }

    impl Decompressor for ReverseRole {
        fn decompress(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
            for (dst, src) in output.iter_mut().zip(input.iter().rev()) {
                *dst = *src;
            }
            Ok(input.len())
        }
    }

    impl CompressionEngine for Reverse {
        fn name(&self) -> &'static str {
            "reverse"
        }

        fn description(&self) -> &'static str {
            "byte order reversal"
        }

        fn compression_level_info(&self) -> ParameterInfo {
            ParameterInfo::range(1, 3)
        }

        fn compressed_bound(&self, uncompressed: usize) -> CompressedBound {
            CompressedBound::Exact(uncompressed)
        }

        fn create_compressor(&self, _options: &Options) -> Result<Box<dyn Compressor>, CodecError> {
            Ok(Box::new(ReverseRole))
        }

        fn create_decompressor(&self, _options: &Options) -> Result<Box<dyn Decompressor>, CodecError> {
            Ok(Box::new(ReverseRole))
        }
    }

    #[test]
    fn builtin_names_are_sorted() {
        let registry = CodecRegistry::builtin();
        assert_eq!(registry.names(), vec!["copy", "deflate", "lz4", "lz4flex", "zstd"]);
        assert!(registry.contains("zstd"));
        assert!(!registry.contains("brotli"));
    }

    #[test]
    fn all_expands_to_every_library() {
        let registry = CodecRegistry::builtin();
        assert_eq!(registry.expand("all").len(), 5);
        assert_eq!(registry.expand("lz4"), vec!["lz4".to_string()]);
    }

    #[test]
    fn unknown_library_is_reported() {
        let err = Smash::new("does-not-exist").unwrap_err();
        assert!(matches!(err, CodecError::UnknownLibrary { ref name } if name == "does-not-exist"));
    }

    #[test]
    fn custom_engine_is_resolvable() {
        let mut registry = CodecRegistry::empty();
        registry.register("reverse", boxed::<Reverse>);

        let mut smash = Smash::with_registry(&registry, "reverse").unwrap();
        smash.set_options_compressor(Options::new().with_compression_level(2)).unwrap();
        let packed = smash.compress_to_vec(b"abc").unwrap();
        assert_eq!(packed, b"cba");

        let infos = registry.describe();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].description, "byte order reversal");
    }

    #[test]
    fn supported_parameters_follow_capabilities() {
        let zstd = Smash::new("zstd").unwrap();
        assert_eq!(
            zstd.supported_parameters(),
            ParameterSet::LEVEL | ParameterSet::WINDOW | ParameterSet::SHUFFLE | ParameterSet::THREADS
        );

        let lz4 = Smash::new("lz4").unwrap();
        assert!(lz4.supported_parameters().contains(ParameterSet::MODE));

        let copy = Smash::new("copy").unwrap();
        assert!(copy.supported_parameters().is_empty());
    }

    #[test]
    fn parameter_info_uses_current_level_for_mode() {
        let lz4 = Smash::new("lz4").unwrap();
        let at_zero = lz4.parameter_info(Parameter::Mode, &Options::new());
        assert_eq!((at_zero.minimum, at_zero.maximum), (0, 0));

        let at_five = lz4.parameter_info(Parameter::Mode, &Options::new().with_compression_level(5));
        assert_eq!((at_five.minimum, at_five.maximum), (0, 1));
        assert_eq!(at_five.label(0), "fast");
        assert_eq!(at_five.label(1), "high");
    }

    #[test]
    fn shuffle_name_uses_engine_labels() {
        let zstd = Smash::new("zstd").unwrap();
        assert_eq!(zstd.shuffle_name(0), "none");
        assert_eq!(zstd.shuffle_name(1), "byte shuffle (4)");
        assert_eq!(zstd.shuffle_name(2), "byte shuffle (8)");
        assert_eq!(zstd.shuffle_name(7), "7");

        assert_eq!(Smash::new("copy").unwrap().shuffle_name(0), "0");
    }

    #[test]
    fn information_lists_supported_parameters() {
        let lines = Smash::new("deflate").unwrap().information();
        assert!(lines[0].starts_with("deflate:"));
        assert!(lines.iter().any(|l| l.contains("compression level") && l.contains("[0-9]")));
        assert!(lines.iter().any(|l| l.contains("gzip")));
        assert!(!lines.iter().any(|l| l.contains("window")));
    }

    #[test]
    fn unsupported_info_is_empty() {
        let info = Smash::new("copy").unwrap().window_size_info();
        assert!(!info.supported);
        assert_eq!((info.minimum, info.maximum), (0, 0));
        assert!(info.labels.is_empty());
    }
}
