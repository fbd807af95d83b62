//! Authentication and registration utility functions.

use rand::prelude::RngExt;
use rand::rng;

/// Generate a supplier reference string
/// Format: "SUP-" followed by 8 characters from an unambiguous alphabet
/// Example: "SUP-7KQ2MW9X"
pub fn generate_supplier_reference() -> String {
    // No 0/O or 1/I, references get read out over the phone
    const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

    let mut rng = rng();
    let suffix: String = (0..8).map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char).collect();

    format!("SUP-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let reference = generate_supplier_reference();
        assert_eq!(reference.len(), 12);
        assert!(reference.starts_with("SUP-"));
        assert!(reference[4..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!reference.contains('0'));
        assert!(!reference.contains('O'));
    }

    #[test]
    fn test_references_are_random() {
        let a = generate_supplier_reference();
        let b = generate_supplier_reference();
        assert_ne!(a, b);
    }
}
