//! Category tree codec.
//!
//! The tree is stored as a JSON object of line → list of subtypes, indented
//! with four spaces and with non-ASCII characters written literally.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use super::CodecError;
use crate::types::CategoryTree;

/// Decode the category tree.
///
/// # Errors
///
/// Returns `CodecError::Json` if the content is not an object of string
/// arrays.
pub fn decode_categories(bytes: &[u8]) -> Result<CategoryTree, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Encode the category tree.
///
/// # Errors
///
/// Returns `CodecError::Json` if serialization fails.
pub fn encode_categories(tree: &CategoryTree) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut out, formatter);
    tree.serialize(&mut serializer)?;
    Ok(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_format() {
        let mut tree = CategoryTree::default();
        tree.add_line("Acero Quirúrgico", Some("Aros")).unwrap();
        tree.add_line("Pañuelos", None).unwrap();

        let encoded = String::from_utf8(encode_categories(&tree).unwrap()).unwrap();
        assert_eq!(
            encoded,
            "{\n    \"Acero Quirúrgico\": [\n        \"Aros\"\n    ],\n    \"Pañuelos\": []\n}"
        );
    }

    #[test]
    fn test_round_trip_defaults() {
        let tree = CategoryTree::shop_defaults();
        let decoded = decode_categories(&encode_categories(&tree).unwrap()).unwrap();
        assert_eq!(decoded, tree);
    }

    #[test]
    fn test_decode_rejects_wrong_shape() {
        assert!(decode_categories(br#"["Plata"]"#).is_err());
        assert!(decode_categories(br#"{"Plata": "Aros"}"#).is_err());
    }
}
