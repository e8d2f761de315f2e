//! # Manifest Parser
//!
//! Decodes kustomization text into a [`Kustomization`]. Only the
//! reference-bearing fields (`resources`, `bases`, `components`) drive the
//! graph; the other well-known fields are kept for display, and unknown keys
//! are retained verbatim in [`Kustomization::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::error::{Error, Result};

/// A parsed kustomization manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kustomization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    /// Deprecated predecessor of `resources`.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_labels: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_annotations: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_generator: Option<Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Manifest fields that reference other nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceField {
    Resources,
    Bases,
    Components,
}

impl ReferenceField {
    pub const ALL: [ReferenceField; 3] = [
        ReferenceField::Resources,
        ReferenceField::Bases,
        ReferenceField::Components,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceField::Resources => "resources",
            ReferenceField::Bases => "bases",
            ReferenceField::Components => "components",
        }
    }
}

impl Kustomization {
    pub fn field(&self, field: ReferenceField) -> &[String] {
        match field {
            ReferenceField::Resources => &self.resources,
            ReferenceField::Bases => &self.bases,
            ReferenceField::Components => &self.components,
        }
    }

    /// Every reference with the field declaring it, in field order.
    pub fn references(&self) -> impl Iterator<Item = (ReferenceField, &str)> + '_ {
        ReferenceField::ALL.into_iter().flat_map(move |field| {
            self.field(field)
                .iter()
                .map(move |reference| (field, reference.as_str()))
        })
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse manifest text; `path` is only used in error messages.
///
/// Fails with [`Error::InvalidManifest`] on a syntax error or when the
/// top-level value is not a mapping.
pub fn parse_manifest(text: &str, path: &str) -> Result<Kustomization> {
    let invalid = |message: String| Error::InvalidManifest {
        path: path.to_string(),
        message,
    };

    let value: Value = serde_yaml::from_str(text).map_err(|e| invalid(e.to_string()))?;
    if !value.is_mapping() {
        return Err(invalid(format!("expected a mapping, found {}", value_kind(&value))));
    }
    serde_yaml::from_value(value).map_err(|e| invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_fields() {
        let text = r#"
apiVersion: kustomize.config.k8s.io/v1beta1
kind: Kustomization
namespace: shop
resources:
  - ../../base
  - deployment.yaml
bases:
  - ../legacy
components:
  - ../../components/monitoring
"#;
        let manifest = parse_manifest(text, "overlays/prod").unwrap();
        assert_eq!(manifest.kind.as_deref(), Some("Kustomization"));
        assert_eq!(manifest.namespace.as_deref(), Some("shop"));
        let references: Vec<_> = manifest.references().collect();
        assert_eq!(
            references,
            vec![
                (ReferenceField::Resources, "../../base"),
                (ReferenceField::Resources, "deployment.yaml"),
                (ReferenceField::Bases, "../legacy"),
                (ReferenceField::Components, "../../components/monitoring"),
            ]
        );
    }

    #[test]
    fn test_null_fields_are_empty() {
        let manifest = parse_manifest("resources:\ncomponents: ~\n", "base").unwrap();
        assert!(manifest.resources.is_empty());
        assert!(manifest.components.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_retained() {
        let manifest = parse_manifest("images:\n  - name: app\n    newTag: v2\n", "base").unwrap();
        assert!(manifest.extra.contains_key("images"));
    }

    #[test]
    fn test_scalar_document_is_invalid() {
        let err = parse_manifest("just a string", "broken").unwrap_err();
        match err {
            Error::InvalidManifest { path, message } => {
                assert_eq!(path, "broken");
                assert!(message.contains("a string"));
            }
            other => panic!("expected InvalidManifest, got {}", other),
        }
    }

    #[test]
    fn test_list_document_is_invalid() {
        assert!(matches!(
            parse_manifest("- a\n- b\n", "list"),
            Err(Error::InvalidManifest { .. })
        ));
    }

    #[test]
    fn test_syntax_error_is_invalid() {
        assert!(matches!(
            parse_manifest("resources: [unclosed", "bad"),
            Err(Error::InvalidManifest { .. })
        ));
    }

    #[test]
    fn test_serializes_camel_case_and_skips_empty() {
        let manifest = parse_manifest("namePrefix: prod-\nresources:\n  - ../base\n", "prod").unwrap();
        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["namePrefix"], "prod-");
        assert_eq!(json["resources"][0], "../base");
        assert!(json.get("components").is_none());
    }
}
