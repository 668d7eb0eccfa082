//! Evidence Image Tool
//!
//! Turns a `store://bucket/object` locator (the `gs://` spelling is
//! accepted for compatibility) into a retrievable public URL. A
//! malformed locator is answered with a descriptive error string so the
//! planner can keep the conversation going.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{Tool, ToolOutput};

const SCHEMES: [&str; 2] = ["store://", "gs://"];

/// Resolve a storage locator to `https://<host>/<bucket>/<object>`.
fn resolve_locator(locator: &str, storage_host: &str) -> std::result::Result<String, String> {
    let rest = SCHEMES
        .iter()
        .find_map(|scheme| locator.strip_prefix(scheme))
        .ok_or_else(|| {
            format!("Invalid storage locator '{locator}': must start with 'store://' or 'gs://'")
        })?;

    match rest.split_once('/') {
        Some((bucket, object)) if !bucket.is_empty() && !object.is_empty() => Ok(format!(
            "{}/{}/{}",
            storage_host.trim_end_matches('/'),
            bucket,
            object
        )),
        _ => Err(format!(
            "Invalid storage locator '{locator}': must include a bucket and an object segment"
        )),
    }
}

pub struct ImageUrlTool {
    storage_host: String,
}

impl ImageUrlTool {
    pub fn new(storage_host: impl Into<String>) -> Self {
        Self {
            storage_host: storage_host.into(),
        }
    }
}

#[async_trait]
impl Tool for ImageUrlTool {
    fn name(&self) -> String {
        "get_image_url".to_string()
    }

    fn description(&self) -> String {
        "Resolve an evidence-image storage locator (store://bucket/object) to a \
         retrievable public URL"
            .to_string()
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "locator": {
                    "type": "string",
                    "description": "The storage locator of the image"
                }
            },
            "required": ["locator"]
        })
    }

    async fn execute(&self, params: Value) -> Result<ToolOutput> {
        let Some(locator) = params.get("locator").and_then(Value::as_str) else {
            return Ok(ToolOutput::failure("Parameter 'locator' must be a string"));
        };
        debug!(locator, "Resolving image locator");

        match resolve_locator(locator, &self.storage_host) {
            Ok(url) => Ok(ToolOutput::success_str(url)),
            Err(message) => Ok(ToolOutput::failure(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "https://storage.cloud.google.com";

    #[test]
    fn resolves_store_and_gs_locators() {
        assert_eq!(
            resolve_locator("store://demo-multimodal/sources/a.jpg", HOST).unwrap(),
            "https://storage.cloud.google.com/demo-multimodal/sources/a.jpg"
        );
        assert_eq!(
            resolve_locator("gs://demo/b.jpg", HOST).unwrap(),
            "https://storage.cloud.google.com/demo/b.jpg"
        );
    }

    #[test]
    fn missing_scheme_is_a_descriptive_error() {
        let err = resolve_locator("demo/b.jpg", HOST).unwrap_err();
        assert!(err.contains("must start with"));
    }

    #[test]
    fn missing_object_segment_is_a_descriptive_error() {
        assert!(resolve_locator("store://bucket-only", HOST)
            .unwrap_err()
            .contains("object segment"));
        assert!(resolve_locator("store://bucket/", HOST).is_err());
        assert!(resolve_locator("store:///object", HOST).is_err());
    }

    #[tokio::test]
    async fn malformed_locator_never_panics_the_tool() {
        let tool = ImageUrlTool::new(HOST);
        let output = tool.execute(json!({"locator": "not-a-locator"})).await.unwrap();
        assert!(!output.success);
        assert!(output.error.unwrap().contains("Invalid storage locator"));
    }
}
