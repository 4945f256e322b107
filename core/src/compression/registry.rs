//! compression/registry.rs
//! Name → engine constructor map. The only place new engines are added.

use std::collections::BTreeMap;

use crate::compression::codec::Codec;
use crate::compression::codecs::{CopyEngine, DeflateEngine, Lz4Engine, Lz4FlexEngine, ZstdEngine};
use crate::compression::constants::ALL_LIBRARIES;
use crate::compression::types::{CodecError, CompressionEngine};

pub type EngineConstructor = fn() -> Box<dyn CompressionEngine>;

/// Constructor for any default-constructible engine.
pub fn boxed<E: CompressionEngine + Default + 'static>() -> Box<dyn CompressionEngine> {
    Box::new(E::default())
}

pub struct CodecInfo {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Clone)]
pub struct CodecRegistry {
    constructors: BTreeMap<&'static str, EngineConstructor>,
}

impl CodecRegistry {
    /// Registry without any engine.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in engine.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("copy", boxed::<CopyEngine>);
        registry.register("deflate", boxed::<DeflateEngine>);
        registry.register("lz4", boxed::<Lz4Engine>);
        registry.register("lz4flex", boxed::<Lz4FlexEngine>);
        registry.register("zstd", boxed::<ZstdEngine>);
        registry
    }

    pub fn register(&mut self, name: &'static str, constructor: EngineConstructor) {
        if self.constructors.insert(name, constructor).is_some() {
            log::warn!("codec {} registered twice, keeping the latest", name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    /// Expand `all` to every registered name; any other name stands for itself.
    pub fn expand(&self, name: &str) -> Vec<String> {
        if name == ALL_LIBRARIES {
            self.names().into_iter().map(String::from).collect()
        } else {
            vec![name.to_string()]
        }
    }

    pub fn resolve(&self, name: &str) -> Result<Box<dyn CompressionEngine>, CodecError> {
        self.constructors
            .get(name)
            .map(|ctor| ctor())
            .ok_or_else(|| CodecError::UnknownLibrary { name: name.into() })
    }

    /// Fresh, unconfigured codec instance.
    pub fn create_codec(&self, name: &str) -> Result<Codec, CodecError> {
        Ok(Codec::new(self.resolve(name)?))
    }

    pub fn describe(&self) -> Vec<CodecInfo> {
        self.constructors
            .iter()
            .map(|(name, ctor)| CodecInfo {
                name: *name,
                description: ctor().description(),
            })
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
