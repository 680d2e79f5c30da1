//! Raw event records delivered by the chain's event subscription.

use serde::{Deserialize, Serialize};

/// A raw, undecoded runtime event.
///
/// Payloads are decoded by the handler with a shape it supplies; the record
/// itself carries no type information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event method name, e.g. `"BlockSubmitted"`
    pub name: String,
    /// Block the event was emitted in
    pub block_number: u64,
    /// Index of the event within the block
    pub index: u32,
    /// SCALE-encoded event data
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>, block_number: u64, index: u32, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            block_number,
            index,
            data,
        }
    }

    /// Stable identifier used to de-duplicate deliveries.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.block_number, self.index, self.name)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("0x{}", hex::encode(data)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_and_serde() {
        let rec = EventRecord::new("BlockSubmitted", 12, 3, vec![0x04, 0x01]);
        assert_eq!(rec.key(), "12:3:BlockSubmitted");
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains(r#""data":"0x0401""#));
        let back: EventRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
