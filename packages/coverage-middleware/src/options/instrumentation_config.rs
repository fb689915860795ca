use std::path::PathBuf;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// `[low, high]` coverage thresholds, in percent.
pub type Watermark = [f64; 2];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentOptions {
    /// Expression the instrumented code resolves the coverage object on.
    pub coverage_global_scope: String,
    /// Wrap the global scope expression into a function call.
    pub coverage_global_scope_func: bool,
    pub produce_source_map: bool,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        InstrumentOptions {
            coverage_global_scope: "window.top".to_string(),
            coverage_global_scope_func: false,
            produce_source_map: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    #[serde(rename = "report-dir")]
    pub report_dir: PathBuf,
    #[serde(rename = "reporter")]
    pub reporters: Vec<String>,
    pub watermarks: IndexMap<String, Watermark>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        let watermarks = ["branches", "functions", "lines", "statements"]
            .into_iter()
            .map(|metric| (metric.to_string(), [50.0, 80.0]))
            .collect();

        ReportOptions {
            report_dir: PathBuf::from("./tmp/coverage-reports"),
            reporters: vec!["html".to_string()],
            watermarks,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentationConfig {
    pub cwd: PathBuf,
    pub instrument: InstrumentOptions,
    pub report: ReportOptions,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        InstrumentationConfig {
            cwd: PathBuf::from("./"),
            instrument: Default::default(),
            report: Default::default(),
        }
    }
}

static DEFAULT_CONFIG: Lazy<Value> = Lazy::new(|| {
    serde_json::to_value(InstrumentationConfig::default()).unwrap_or(Value::Null)
});

impl InstrumentationConfig {
    /// Deep-merges `overrides` over the defaults. Objects are merged key by key,
    /// `null` leaves are treated as not set, and leaves whose kind does not
    /// match the default are skipped.
    pub fn build(overrides: Option<&Value>) -> InstrumentationConfig {
        let overrides = match overrides {
            Some(overrides) => overrides,
            None => return Default::default(),
        };

        let mut merged = DEFAULT_CONFIG.clone();
        merge_value(&mut merged, overrides, "");

        serde_json::from_value(merged).unwrap_or_else(|err| {
            warn!("Could not apply coverage configuration, using defaults: {}", err);
            Default::default()
        })
    }

    /// Directory the report viewer is served from.
    pub fn report_root(&self) -> PathBuf {
        self.cwd.join(&self.report.report_dir)
    }
}

fn merge_value(base: &mut Value, overrides: &Value, key_path: &str) {
    match (base, overrides) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, base_value) in base.iter_mut() {
                if let Some(value) = overrides.get(key) {
                    let nested_path = if key_path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", key_path, key)
                    };
                    merge_value(base_value, value, &nested_path);
                }
            }
        }
        (base, value) => {
            if is_compatible(base, value) {
                *base = value.clone();
            } else {
                warn!(
                    "Ignoring coverage configuration `{}`: expected a value like {}, got {}",
                    key_path, base, value
                );
            }
        }
    }
}

fn is_compatible(default: &Value, value: &Value) -> bool {
    match (default, value) {
        (Value::Bool(_), Value::Bool(_)) | (Value::String(_), Value::String(_)) => true,
        (Value::Number(_), Value::Number(_)) => true,
        (Value::Array(default), Value::Array(value)) => match default.first() {
            None => true,
            // numeric arrays are fixed-size tuples such as watermarks
            Some(Value::Number(_)) => {
                value.len() == default.len() && value.iter().all(Value::is_number)
            }
            Some(first) => value
                .iter()
                .all(|item| std::mem::discriminant(first) == std::mem::discriminant(item)),
        },
        _ => false,
    }
}
