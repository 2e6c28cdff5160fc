//! Two-level category taxonomy: lines (materials) and subtypes.
//!
//! A product's category is stored as a single string. When the line has
//! subtypes the string is `"<line> - <subtype>"` (e.g. `"Acero Dorado - Aros"`),
//! otherwise it is the bare line (e.g. `"Pañuelos"`).

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Separator between line and subtype in a composite category.
pub const CATEGORY_SEPARATOR: &str = " - ";

/// A category split into its line and optional subtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryPath {
    pub line: String,
    pub subtype: Option<String>,
}

impl CategoryPath {
    /// Split a stored category string on the first separator.
    ///
    /// An empty subtype (`"Plata - "`) counts as no subtype.
    #[must_use]
    pub fn parse(category: &str) -> Self {
        match category.split_once(CATEGORY_SEPARATOR) {
            Some((line, subtype)) => {
                let subtype = subtype.trim();
                Self {
                    line: line.trim().to_string(),
                    subtype: (!subtype.is_empty()).then(|| subtype.to_string()),
                }
            }
            None => Self {
                line: category.trim().to_string(),
                subtype: None,
            },
        }
    }

    /// Compose the stored category string.
    #[must_use]
    pub fn compose(line: &str, subtype: Option<&str>) -> String {
        match subtype {
            Some(subtype) => format!("{line}{CATEGORY_SEPARATOR}{subtype}"),
            None => line.to_string(),
        }
    }
}

impl fmt::Display for CategoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Self::compose(&self.line, self.subtype.as_deref()))
    }
}

/// Errors from editing or resolving against the category tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("category name must not be empty")]
    EmptyName,

    #[error("category name must not contain \" - \": {0}")]
    ContainsSeparator(String),

    #[error("line already exists: {0}")]
    LineExists(String),

    #[error("unknown line: {0}")]
    UnknownLine(String),

    #[error("subtype {subtype} already exists in {line}")]
    SubtypeExists { line: String, subtype: String },

    #[error("unknown subtype {subtype} in {line}")]
    UnknownSubtype { line: String, subtype: String },

    #[error("line {0} requires a subtype")]
    SubtypeRequired(String),
}

/// One line and its ordered subtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLine {
    pub name: String,
    pub subtypes: Vec<String>,
}

/// Ordered mapping from line to subtypes.
///
/// Serializes as a JSON object whose key order is the line order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryTree {
    lines: Vec<CategoryLine>,
}

impl CategoryTree {
    /// The tree the shop starts with when no categories file exists yet.
    #[must_use]
    pub fn shop_defaults() -> Self {
        let full = ["Aros", "Pulseras", "Collares", "Dijes", "Anillos"];
        let entries: [(&str, &[&str]); 6] = [
            ("Acero Blanco", &full),
            ("Acero Dorado", &full),
            ("Acero Quirúrgico", &["Aros", "Pulseras", "Collares", "Dijes"]),
            ("Plata", &["Aros"]),
            ("Pañuelos", &[]),
            ("Complementos", &[]),
        ];
        Self {
            lines: entries
                .iter()
                .map(|(name, subtypes)| CategoryLine {
                    name: (*name).to_string(),
                    subtypes: subtypes.iter().map(|s| (*s).to_string()).collect(),
                })
                .collect(),
        }
    }

    /// All lines in order.
    #[must_use]
    pub fn lines(&self) -> &[CategoryLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtypes of a line, if the line exists.
    #[must_use]
    pub fn subtypes(&self, line: &str) -> Option<&[String]> {
        self.find(line).map(|l| l.subtypes.as_slice())
    }

    #[must_use]
    pub fn contains_line(&self, line: &str) -> bool {
        self.find(line).is_some()
    }

    /// Add a new line, optionally with its first subtype.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or contains the separator, or the
    /// line already exists.
    pub fn add_line(&mut self, name: &str, first_subtype: Option<&str>) -> Result<(), CategoryError> {
        let name = validate_name(name)?;
        if self.contains_line(&name) {
            return Err(CategoryError::LineExists(name));
        }
        let subtypes = match first_subtype.map(str::trim).filter(|s| !s.is_empty()) {
            Some(subtype) => vec![validate_name(subtype)?],
            None => Vec::new(),
        };
        self.lines.push(CategoryLine { name, subtypes });
        Ok(())
    }

    /// Append a subtype to an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown, the name is invalid, or the
    /// subtype already exists in that line.
    pub fn add_subtype(&mut self, line: &str, subtype: &str) -> Result<(), CategoryError> {
        let subtype = validate_name(subtype)?;
        let entry = self
            .lines
            .iter_mut()
            .find(|l| l.name == line)
            .ok_or_else(|| CategoryError::UnknownLine(line.to_string()))?;
        if entry.subtypes.contains(&subtype) {
            return Err(CategoryError::SubtypeExists {
                line: line.to_string(),
                subtype,
            });
        }
        entry.subtypes.push(subtype);
        Ok(())
    }

    /// Build the stored category string for a line/subtype selection.
    ///
    /// Lines with subtypes require one of them; lines without subtypes ignore
    /// any subtype given.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or subtype is unknown, or a subtype is
    /// required but missing.
    pub fn resolve(&self, line: &str, subtype: Option<&str>) -> Result<String, CategoryError> {
        let entry = self
            .find(line)
            .ok_or_else(|| CategoryError::UnknownLine(line.to_string()))?;
        if entry.subtypes.is_empty() {
            return Ok(CategoryPath::compose(&entry.name, None));
        }
        let subtype = subtype
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CategoryError::SubtypeRequired(line.to_string()))?;
        if !entry.subtypes.iter().any(|s| s == subtype) {
            return Err(CategoryError::UnknownSubtype {
                line: line.to_string(),
                subtype: subtype.to_string(),
            });
        }
        Ok(CategoryPath::compose(&entry.name, Some(subtype)))
    }

    fn find(&self, line: &str) -> Option<&CategoryLine> {
        self.lines.iter().find(|l| l.name == line)
    }
}

fn validate_name(name: &str) -> Result<String, CategoryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    if name.contains(CATEGORY_SEPARATOR) {
        return Err(CategoryError::ContainsSeparator(name.to_string()));
    }
    Ok(name.to_string())
}

impl Serialize for CategoryTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lines.len()))?;
        for line in &self.lines {
            map.serialize_entry(&line.name, &line.subtypes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategoryTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TreeVisitor;

        impl<'de> Visitor<'de> for TreeVisitor {
            type Value = CategoryTree;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category lines to lists of subtypes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut lines: Vec<CategoryLine> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, subtypes)) = access.next_entry::<String, Vec<String>>()? {
                    // Duplicate keys: the later value wins, the first position is kept.
                    match lines.iter_mut().find(|l| l.name == name) {
                        Some(existing) => existing.subtypes = subtypes,
                        None => lines.push(CategoryLine { name, subtypes }),
                    }
                }
                Ok(CategoryTree { lines })
            }
        }

        deserializer.deserialize_map(TreeVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_composite_category() {
        let path = CategoryPath::parse("Acero Dorado - Aros");
        assert_eq!(path.line, "Acero Dorado");
        assert_eq!(path.subtype.as_deref(), Some("Aros"));
    }

    #[test]
    fn test_split_bare_line() {
        let path = CategoryPath::parse("Pañuelos");
        assert_eq!(path.line, "Pañuelos");
        assert_eq!(path.subtype, None);
    }

    #[test]
    fn test_split_empty_subtype() {
        let path = CategoryPath::parse("Plata - ");
        assert_eq!(path.line, "Plata");
        assert_eq!(path.subtype, None);
    }

    #[test]
    fn test_compose_round_trips_through_parse() {
        let composed = CategoryPath::compose("Plata", Some("Aros"));
        assert_eq!(composed, "Plata - Aros");
        assert_eq!(CategoryPath::parse(&composed).to_string(), composed);
    }

    #[test]
    fn test_add_line_and_subtype() {
        let mut tree = CategoryTree::default();
        tree.add_line("Oro 18k", Some("Anillos")).unwrap();
        tree.add_subtype("Oro 18k", "Tobilleras").unwrap();
        assert_eq!(
            tree.subtypes("Oro 18k").unwrap(),
            &["Anillos".to_string(), "Tobilleras".to_string()]
        );
    }

    #[test]
    fn test_add_line_without_subtype() {
        let mut tree = CategoryTree::default();
        tree.add_line("Llaveros", Some("  ")).unwrap();
        assert!(tree.subtypes("Llaveros").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut tree = CategoryTree::shop_defaults();
        assert_eq!(
            tree.add_line("Plata", None),
            Err(CategoryError::LineExists("Plata".to_string()))
        );
        assert!(matches!(
            tree.add_subtype("Plata", "Aros"),
            Err(CategoryError::SubtypeExists { .. })
        ));
        assert_eq!(
            tree.add_subtype("Oro", "Aros"),
            Err(CategoryError::UnknownLine("Oro".to_string()))
        );
    }

    #[test]
    fn test_names_with_separator_rejected() {
        let mut tree = CategoryTree::default();
        assert!(matches!(
            tree.add_line("Oro - Blanco", None),
            Err(CategoryError::ContainsSeparator(_))
        ));
        assert_eq!(tree.add_line("   ", None), Err(CategoryError::EmptyName));
    }

    #[test]
    fn test_resolve() {
        let tree = CategoryTree::shop_defaults();
        assert_eq!(tree.resolve("Plata", Some("Aros")).unwrap(), "Plata - Aros");
        assert_eq!(tree.resolve("Pañuelos", Some("Aros")).unwrap(), "Pañuelos");
        assert_eq!(
            tree.resolve("Plata", None),
            Err(CategoryError::SubtypeRequired("Plata".to_string()))
        );
        assert!(matches!(
            tree.resolve("Plata", Some("Collares")),
            Err(CategoryError::UnknownSubtype { .. })
        ));
    }

    #[test]
    fn test_serde_preserves_line_order() {
        let json = r#"{"Zafiro": ["Aros"], "Acero": [], "Malla": ["Dijes", "Aros"]}"#;
        let tree: CategoryTree = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = tree.lines().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Zafiro", "Acero", "Malla"]);

        let back = serde_json::to_string(&tree).unwrap();
        assert_eq!(back, r#"{"Zafiro":["Aros"],"Acero":[],"Malla":["Dijes","Aros"]}"#);
    }
}
