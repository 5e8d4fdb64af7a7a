//! The value model substituted into Dockerfile templates.
//!
//! Decoding is permissive: unknown keys are ignored, missing keys become empty
//! strings, and any YAML scalar is accepted for a field (`appVersion: 1.2`
//! decodes to `"1.2"`). Templates are expected to cope with partially
//! specified value sets.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{io_err, DecodeError};

/// Values available to every template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockerfileValues {
    /// Name of the application; usually the image name.
    #[serde(deserialize_with = "scalar_string")]
    pub app_name: String,
    /// Version of the application; usually the image tag.
    #[serde(deserialize_with = "scalar_string")]
    pub app_version: String,
    /// Build target. Conventionally `.` for the current directory's main package.
    #[serde(deserialize_with = "scalar_string")]
    pub main_package: String,
    /// Image used for the build stage.
    #[serde(deserialize_with = "scalar_string")]
    pub builder_image: String,
    /// Image and tag of the final runtime container.
    #[serde(deserialize_with = "scalar_string")]
    pub runtime_image: String,
}

impl DockerfileValues {
    /// Decode values from a YAML string. `source_name` labels errors.
    pub fn from_yaml_str(yaml: &str, source_name: &str) -> Result<Self, DecodeError> {
        if is_blank_document(yaml) {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<Option<Self>>(yaml)
            .map(Option::unwrap_or_default)
            .map_err(|source| DecodeError::Yaml {
                source_name: source_name.to_owned(),
                source,
            })
    }

    /// Decode values from raw bytes.
    pub fn from_yaml_slice(bytes: &[u8], source_name: &str) -> Result<Self, DecodeError> {
        let text = String::from_utf8_lossy(bytes);
        Self::from_yaml_str(&text, source_name)
    }

    /// Read the whole of `reader` (typically stdin) and decode it.
    pub fn from_reader(mut reader: impl Read, source_name: &str) -> Result<Self, DecodeError> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|source| DecodeError::Io {
                source_name: source_name.to_owned(),
                source,
            })?;
        Self::from_yaml_slice(&buf, source_name)
    }

    /// Read and decode the data file at `path`.
    pub fn load(path: &Path) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
        Self::from_yaml_slice(&bytes, &path.display().to_string())
    }
}

/// Empty, whitespace-only, comment-only and bare `---` documents carry no values.
fn is_blank_document(yaml: &str) -> bool {
    yaml.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Tagged(tagged)) => match tagged.value {
            Value::String(s) => Ok(s),
            other => Err(D::Error::custom(format!(
                "expected a scalar value, found {other:?}"
            ))),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected a scalar value, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        _ => "a non-scalar value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_fields() {
        let yaml = "appName: api\nappVersion: 1.0.0\nmainPackage: ./cmd/server\nbuilderImage: golang:1.22\nruntimeImage: gcr.io/distroless/static\n";
        let v = DockerfileValues::from_yaml_str(yaml, "values.yaml").expect("decode");
        assert_eq!(v.app_name, "api");
        assert_eq!(v.app_version, "1.0.0");
        assert_eq!(v.main_package, "./cmd/server");
        assert_eq!(v.builder_image, "golang:1.22");
        assert_eq!(v.runtime_image, "gcr.io/distroless/static");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let v = DockerfileValues::from_yaml_str("appName: api\n", "values.yaml").expect("decode");
        assert_eq!(v.app_name, "api");
        assert!(v.main_package.is_empty());
        assert!(v.runtime_image.is_empty());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let v = DockerfileValues::from_yaml_str("appName: api\nreplicas: 3\nextra: {a: b}\n", "v")
            .expect("decode");
        assert_eq!(v.app_name, "api");
    }

    #[test]
    fn non_string_scalars_are_stringified() {
        let v = DockerfileValues::from_yaml_str("appVersion: 2\nappName: true\nmainPackage: ~\n", "v")
            .expect("decode");
        assert_eq!(v.app_version, "2");
        assert_eq!(v.app_name, "true");
        assert_eq!(v.main_package, "");
    }

    #[test]
    fn blank_documents_decode_to_defaults() {
        for doc in ["", "   \n", "# only a comment\n", "---\n", "~"] {
            let v = DockerfileValues::from_yaml_str(doc, "v").expect("decode");
            assert_eq!(v, DockerfileValues::default(), "doc: {doc:?}");
        }
    }

    #[test]
    fn sequence_document_is_rejected() {
        let err = DockerfileValues::from_yaml_str("- not\n- a mapping\n", "data.yaml").unwrap_err();
        assert!(matches!(err, DecodeError::Yaml { .. }), "got: {err}");
        assert_eq!(err.source_name(), "data.yaml");
    }

    #[test]
    fn nested_value_for_field_is_rejected() {
        let err = DockerfileValues::from_yaml_str("appName: [a, b]\n", "v").unwrap_err();
        assert!(err.to_string().contains("failed to unmarshal yaml"));
    }

    #[test]
    fn from_reader_reads_everything() {
        let v = DockerfileValues::from_reader("mainPackage: .\n".as_bytes(), "<stdin>")
            .expect("decode");
        assert_eq!(v.main_package, ".");
    }
}
