//! compression/codecs/mod.rs
//! Concrete engines. Each one adapts a single library to `CompressionEngine`.

pub mod copy;
pub mod deflate;
pub mod lz4;
pub mod lz4flex;
pub mod zstd;

pub use self::copy::CopyEngine;
pub use self::deflate::DeflateEngine;
pub use self::lz4::Lz4Engine;
pub use self::lz4flex::Lz4FlexEngine;
pub use self::zstd::ZstdEngine;
