//! Template context — the view of [`DockerfileValues`] templates see.

use serde::Serialize;

use dockergen_core::DockerfileValues;

use crate::error::{describe, RenderError};

/// Values exposed to templates under their PascalCase names, so a template
/// writes `{{ MainPackage }}` regardless of the camelCase keys in the data file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateContext {
    pub app_name: String,
    pub app_version: String,
    pub main_package: String,
    pub builder_image: String,
    pub runtime_image: String,
}

impl TemplateContext {
    pub fn from_values(values: &DockerfileValues) -> Self {
        TemplateContext {
            app_name: values.app_name.clone(),
            app_version: values.app_version.clone(),
            main_package: values.main_package.clone(),
            builder_image: values.builder_image.clone(),
            runtime_image: values.runtime_image.clone(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(|e| RenderError::Context {
            message: describe(&e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_uses_pascal_case_keys() {
        let values = DockerfileValues {
            main_package: "./cmd/server".into(),
            ..Default::default()
        };
        let ctx = TemplateContext::from_values(&values);
        let json = serde_json::to_value(&ctx).expect("serialize");
        assert_eq!(json["MainPackage"], "./cmd/server");
        assert_eq!(json["AppName"], "");
        assert!(json.get("main_package").is_none());
    }

    #[test]
    fn to_tera_context_succeeds() {
        let ctx = TemplateContext::from_values(&DockerfileValues::default());
        let tera_ctx = ctx.to_tera_context().expect("context conversion");
        assert!(tera_ctx.contains_key("RuntimeImage"));
    }
}
