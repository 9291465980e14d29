//! Request bodies for realistic probing.

use bytes::Bytes;
use rand::Rng;
use serde_json::json;

/// A `{"selection": [0|1, ...]}` body with `len` random bits.
pub fn selection_payload<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Bytes {
    let selection: Vec<u8> = (0..len).map(|_| rng.random_range(0..2u8)).collect();
    Bytes::from(json!({ "selection": selection }).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn payload_is_binary_vector_of_requested_length() {
        let mut rng = StdRng::seed_from_u64(42);
        let body = selection_payload(&mut rng, 50);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let selection = value["selection"].as_array().unwrap();
        assert_eq!(selection.len(), 50);
        assert!(selection.iter().all(|v| v == 0 || v == 1));
    }

    #[test]
    fn empty_payload() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(&selection_payload(&mut rng, 0)[..], br#"{"selection":[]}"#);
    }
}
