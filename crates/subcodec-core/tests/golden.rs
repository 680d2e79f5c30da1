//! Golden reference-vector tests.
//!
//! Each vector in `fixtures/vectors.json` pairs a shape and value with the
//! bytes the runtime's own codec produces for them. The `u256-*` vectors were
//! recorded from the reference client; the `u64-*` vectors pin the 64-bit
//! integer width used across the rest of the suite.

use subcodec_core::{decode, encode, CodecError, Shape, Value};

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Parse hex bytes from a `"0x..."` string.
fn hex_to_bytes(s: &str) -> Vec<u8> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).unwrap_or_else(|e| panic!("bad hex '{s}': {e}"))
}

/// The fixtures live two levels above the crate root.
fn fixture_path(name: &str) -> std::path::PathBuf {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures");
    p.push(name);
    p
}

struct Vector {
    name: String,
    shape: Shape,
    value: Value,
    encoded: Vec<u8>,
}

fn load_vectors() -> Vec<Vector> {
    let json = std::fs::read_to_string(fixture_path("vectors.json")).expect("fixture not found");
    let root: serde_json::Value = serde_json::from_str(&json).expect("invalid fixture JSON");
    root["vectors"]
        .as_array()
        .expect("vectors array")
        .iter()
        .map(|v| {
            let name = v["name"].as_str().unwrap().to_string();
            Vector {
                shape: serde_json::from_value(v["shape"].clone())
                    .unwrap_or_else(|e| panic!("{name}: bad shape: {e}")),
                value: serde_json::from_value(v["value"].clone())
                    .unwrap_or_else(|e| panic!("{name}: bad value: {e}")),
                encoded: hex_to_bytes(v["encoded"].as_str().unwrap()),
                name,
            }
        })
        .collect()
}

// ─── Vectors ──────────────────────────────────────────────────────────────────

#[test]
fn fixtures_are_present() {
    let vectors = load_vectors();
    assert!(vectors.len() >= 10, "expected the full vector set");
    assert!(vectors.iter().any(|v| v.name == "u256-list-of-tuples"));
}

#[test]
fn encode_matches_reference_bytes() {
    for v in load_vectors() {
        let got = encode(&v.value).unwrap_or_else(|e| panic!("{}: {e}", v.name));
        assert_eq!(
            hex::encode(&got),
            hex::encode(&v.encoded),
            "{}: encoding mismatch",
            v.name
        );
    }
}

#[test]
fn decode_matches_reference_value() {
    for v in load_vectors() {
        let got = decode(&v.shape, &v.encoded).unwrap_or_else(|e| panic!("{}: {e}", v.name));
        assert_eq!(got, v.value, "{}: decode mismatch", v.name);
    }
}

#[test]
fn fixture_shapes_match_values() {
    for v in load_vectors() {
        assert_eq!(v.value.shape(), v.shape, "{}: shape mismatch", v.name);
    }
}

#[test]
fn struct_and_tuple_vectors_share_bytes() {
    let vectors = load_vectors();
    for width in ["u64", "u256"] {
        let find = |suffix: &str| {
            vectors
                .iter()
                .find(|v| v.name == format!("{width}-{suffix}"))
                .unwrap_or_else(|| panic!("missing {width}-{suffix}"))
        };
        assert_eq!(find("struct").encoded, find("tuple").encoded);
    }
}

// ─── Failure cases ────────────────────────────────────────────────────────────

#[test]
fn every_strict_prefix_fails() {
    for v in load_vectors() {
        for cut in 0..v.encoded.len() {
            let err = decode(&v.shape, &v.encoded[..cut]).unwrap_err();
            assert!(
                matches!(
                    err,
                    CodecError::TruncatedInput { .. } | CodecError::MalformedCompactPrefix { .. }
                ),
                "{} cut at {cut}: unexpected {err}",
                v.name
            );
        }
    }
}
