//! Rayon-powered batch helpers.
//!
//! Encode and decode are pure, so independent inputs can be processed on
//! any number of threads. Results are returned in input order, one per input.

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodecError;
use crate::shape::Shape;
use crate::value::Value;
use rayon::prelude::*;

/// Encode every value in parallel.
pub fn encode_batch(values: &[Value], config: &CodecConfig) -> Vec<Result<Vec<u8>, CodecError>> {
    let encoder = Encoder::new(config.clone());
    values.par_iter().map(|v| encoder.encode(v)).collect()
}

/// Decode every payload against the same shape in parallel.
pub fn decode_batch<P>(
    shape: &Shape,
    payloads: &[P],
    config: &CodecConfig,
) -> Vec<Result<Value, CodecError>>
where
    P: AsRef<[u8]> + Sync,
{
    let decoder = Decoder::new(config.clone());
    payloads
        .par_iter()
        .map(|p| decoder.decode(shape, p.as_ref()))
        .collect()
}

/// Split batch results into successes and `(index, error)` pairs.
pub fn partition_results<T>(results: Vec<Result<T, CodecError>>) -> (Vec<T>, Vec<(usize, CodecError)>) {
    let mut ok = Vec::new();
    let mut errors = Vec::new();
    for (idx, r) in results.into_iter().enumerate() {
        match r {
            Ok(v) => ok.push(v),
            Err(e) => errors.push((idx, e)),
        }
    }
    (ok, errors)
}
