//! # Deltasync Serde
//! Byte-level writer, reader and the `Serde` trait used by every frame the
//! deltasync crates put on the wire. All fixed-width values are little-endian.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod impls;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteCounter, ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use serde::{ConstByteLength, Serde};
