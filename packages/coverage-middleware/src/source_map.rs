use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::Result;

// split: tooling scanning this file must not pick the directive up
const SOURCE_MAPPING_URL: &str = concat!("//", "# sourceMappingURL");
const DATA_URI_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    pub names: Vec<String>,
    pub mappings: String,
}

impl Default for SourceMap {
    fn default() -> Self {
        SourceMap {
            version: 3,
            file: Default::default(),
            source_root: Default::default(),
            sources: Default::default(),
            sources_content: Default::default(),
            names: Default::default(),
            mappings: "".to_string(),
        }
    }
}

/// Trailing comment embedding `map` as a base64 data URI, starting on a new line.
pub fn inline_source_map_comment<T: Serialize + ?Sized>(map: &T) -> Result<String> {
    let serialized = serde_json::to_string(map)?;

    Ok(format!(
        "\r\n{}={}{}",
        SOURCE_MAPPING_URL,
        DATA_URI_PREFIX,
        STANDARD.encode(serialized)
    ))
}

/// Marker every inline source map comment starts with, used to detect them.
pub fn inline_source_map_marker() -> String {
    format!("{}={}", SOURCE_MAPPING_URL, DATA_URI_PREFIX)
}
