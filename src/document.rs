//! The decoded configuration document as a tagged value tree.
//!
//! Top-level keys are root field long names. A key matching a command's
//! lower-cased name holds that command's own section.

use std::collections::BTreeMap;

use crate::error::ClapbindError;
use crate::types::{FieldValue, Kind};

pub type Section = BTreeMap<String, DocValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<DocValue>),
    Map(Section),
    Null,
}

impl DocValue {
    /// Name used in mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            DocValue::Bool(_) => "boolean",
            DocValue::Integer(_) => "integer",
            DocValue::Float(_) => "float",
            DocValue::String(_) => "string",
            DocValue::List(_) => "list",
            DocValue::Map(_) => "mapping",
            DocValue::Null => "null",
        }
    }

    /// Checked conversion into a value of `kind`.
    pub fn convert(&self, key: &str, kind: Kind) -> Result<FieldValue, ClapbindError> {
        let converted = match (kind, self) {
            (Kind::Bool, DocValue::Bool(b)) => Some(FieldValue::Bool(*b)),
            (Kind::Str, DocValue::String(s)) => Some(FieldValue::Str(s.clone())),
            (Kind::Int, DocValue::Integer(i)) => Some(FieldValue::Int(*i)),
            (Kind::Uint, DocValue::Integer(i)) => u64::try_from(*i).ok().map(FieldValue::Uint),
            (Kind::List, DocValue::List(items)) => items
                .iter()
                .map(|item| match item {
                    DocValue::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            _ => None,
        };
        converted.ok_or_else(|| ClapbindError::TypeMismatch {
            key: key.to_string(),
            expected: kind,
            found: self.describe(),
        })
    }

    fn describe(&self) -> String {
        match self {
            DocValue::Integer(i) if *i < 0 => format!("negative integer {i}"),
            DocValue::List(items) => match items.iter().find(|v| !matches!(v, DocValue::String(_))) {
                Some(bad) => format!("list containing {}", bad.type_name()),
                None => "list".to_string(),
            },
            other => other.type_name().to_string(),
        }
    }
}

/// A loaded configuration document. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Section,
}

impl Document {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_section(root: Section) -> Self {
        Self { root }
    }

    /// Decode YAML. Empty input is an empty document; a top level that is not
    /// a mapping is malformed.
    pub fn from_yaml_str(content: &str) -> Result<Self, ClapbindError> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ClapbindError::MalformedDocument(e.to_string()))?;
        match from_yaml(value) {
            DocValue::Null => Ok(Self::empty()),
            DocValue::Map(root) => Ok(Self { root }),
            other => Err(ClapbindError::MalformedDocument(format!(
                "top level is a {}, expected a mapping",
                other.type_name()
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ClapbindError> {
        let table: toml::Table = content
            .parse()
            .map_err(|e: toml::de::Error| ClapbindError::MalformedDocument(e.to_string()))?;
        let root = table
            .into_iter()
            .map(|(k, v)| (k, from_toml(v)))
            .collect();
        Ok(Self { root })
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// The section for a context: the top level for the root, or the mapping
    /// under the command's lower-cased name.
    pub fn segment(&self, command: Option<&str>) -> Option<&Section> {
        match command {
            None => Some(&self.root),
            Some(name) => match self.root.get(&name.to_lowercase()) {
                Some(DocValue::Map(section)) => Some(section),
                _ => None,
            },
        }
    }
}

fn from_yaml(value: serde_yaml::Value) -> DocValue {
    use serde_yaml::Value;
    match value {
        Value::Null => DocValue::Null,
        Value::Bool(b) => DocValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DocValue::Integer(i),
            None => DocValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => DocValue::String(s),
        Value::Sequence(items) => DocValue::List(items.into_iter().map(from_yaml).collect()),
        Value::Mapping(map) => DocValue::Map(
            map.into_iter()
                .filter_map(|(k, v)| yaml_key(k).map(|k| (k, from_yaml(v))))
                .collect(),
        ),
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;
    match key {
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => {
            tracing::debug!(key = ?other, "ignoring non-scalar key in config document");
            None
        }
    }
}

fn from_toml(value: toml::Value) -> DocValue {
    match value {
        toml::Value::String(s) => DocValue::String(s),
        toml::Value::Integer(i) => DocValue::Integer(i),
        toml::Value::Float(f) => DocValue::Float(f),
        toml::Value::Boolean(b) => DocValue::Bool(b),
        toml::Value::Datetime(d) => DocValue::String(d.to_string()),
        toml::Value::Array(items) => DocValue::List(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => {
            DocValue::Map(table.into_iter().map(|(k, v)| (k, from_toml(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_root_and_command_sections() {
        let doc = Document::from_yaml_str(
            "name: alice\nport: 9000\nsync:\n  remote: origin\n  branches: [main, dev]\n",
        )
        .unwrap();
        let root = doc.segment(None).unwrap();
        assert_eq!(root["name"], DocValue::String("alice".into()));
        assert_eq!(root["port"], DocValue::Integer(9000));

        let sync = doc.segment(Some("Sync")).unwrap();
        assert_eq!(sync["remote"], DocValue::String("origin".into()));
    }

    #[test]
    fn command_without_mapping_has_no_segment() {
        let doc = Document::from_yaml_str("sync: 3\n").unwrap();
        assert!(doc.segment(Some("sync")).is_none());
        assert!(doc.segment(Some("other")).is_none());
    }

    #[test]
    fn empty_yaml_is_empty_document() {
        assert!(Document::from_yaml_str("").unwrap().is_empty());
        assert!(Document::from_yaml_str("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn non_mapping_yaml_is_malformed() {
        let err = Document::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(err, ClapbindError::MalformedDocument(_)));
        assert!(Document::from_yaml_str("key: [unclosed").is_err());
    }

    #[test]
    fn toml_document_converts() {
        let doc = Document::from_toml_str(
            "name = \"bob\"\nverbose = true\n[sync]\ndepth = 2\nwhen = 1979-05-27\n",
        )
        .unwrap();
        let root = doc.segment(None).unwrap();
        assert_eq!(root["verbose"], DocValue::Bool(true));
        let sync = doc.segment(Some("sync")).unwrap();
        assert_eq!(sync["depth"], DocValue::Integer(2));
        assert_eq!(sync["when"], DocValue::String("1979-05-27".into()));
    }

    #[test]
    fn convert_matching_kinds() {
        assert_eq!(
            DocValue::Bool(true).convert("v", Kind::Bool).unwrap(),
            FieldValue::Bool(true)
        );
        assert_eq!(
            DocValue::Integer(-3).convert("o", Kind::Int).unwrap(),
            FieldValue::Int(-3)
        );
        assert_eq!(
            DocValue::Integer(3).convert("p", Kind::Uint).unwrap(),
            FieldValue::Uint(3)
        );
        let list = DocValue::List(vec![DocValue::String("a".into())]);
        assert_eq!(
            list.convert("t", Kind::List).unwrap(),
            FieldValue::List(vec!["a".into()])
        );
    }

    #[test]
    fn convert_mismatches_are_errors() {
        let err = DocValue::String("x".into()).convert("port", Kind::Uint).unwrap_err();
        assert!(matches!(
            err,
            ClapbindError::TypeMismatch { ref key, expected: Kind::Uint, ref found }
                if key == "port" && found == "string"
        ));

        let err = DocValue::Integer(-1).convert("port", Kind::Uint).unwrap_err();
        assert!(err.to_string().contains("negative"));

        let mixed = DocValue::List(vec![DocValue::String("a".into()), DocValue::Integer(1)]);
        let err = mixed.convert("tags", Kind::List).unwrap_err();
        assert!(err.to_string().contains("list containing integer"));

        assert!(DocValue::Integer(1).convert("v", Kind::Bool).is_err());
        assert!(DocValue::Null.convert("n", Kind::Str).is_err());
    }
}
