//! Response envelope decoding

pub mod decoder;

pub use decoder::ResponseDecoder;
