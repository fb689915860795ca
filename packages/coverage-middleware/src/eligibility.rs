use serde_json::Value;

use crate::{excludes::ExcludePattern, request::CoverageRequest};

pub const INSTRUMENT_QUERY_FLAG: &str = "instrument";
pub const SCRIPT_EXTENSION: &str = ".js";

/// Only an explicit `"true"` / `true` enables instrumentation.
pub fn is_instrumentation_flag_set(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag == "true",
        _ => false,
    }
}

/// Whether the resource requested by `request` should be instrumented. Cheap
/// checks run first so excluded or unflagged resources are never resolved.
pub fn should_instrument_resource(request: &CoverageRequest, exclude_patterns: &[ExcludePattern]) -> bool {
    if !request.path.ends_with(SCRIPT_EXTENSION) {
        return false;
    }

    if !is_instrumentation_flag_set(request.query_value(INSTRUMENT_QUERY_FLAG)) {
        return false;
    }

    !exclude_patterns
        .iter()
        .any(|pattern| pattern.is_match(&request.path))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pattern(source: &str) -> ExcludePattern {
        ExcludePattern::configured(source).unwrap()
    }

    #[test]
    fn no_js_file() {
        let request = CoverageRequest::get("Test.html").with_query("instrument", "true");
        assert!(!should_instrument_resource(&request, &[]));
    }

    #[test]
    fn non_flagged_resources() {
        assert!(!should_instrument_resource(&CoverageRequest::get("Test.js"), &[]));
    }

    #[test]
    fn flag_resource_as_non_instrumented() {
        let disabled = [
            json!("false"),
            json!("0"),
            json!("undefined"),
            json!("null"),
            json!(false),
            json!(0),
            Value::Null,
        ];

        for value in disabled {
            let request = CoverageRequest::get("Test.js").with_query("instrument", value.clone());
            assert!(!should_instrument_resource(&request, &[]), "{} should disable", value);
        }
    }

    #[test]
    fn flagged_without_excludes() {
        let request = CoverageRequest::get("Test.js").with_query("instrument", "true");
        assert!(should_instrument_resource(&request, &[]));

        let request = CoverageRequest::get("Test.js").with_query("instrument", true);
        assert!(should_instrument_resource(&request, &[]));
    }

    #[test]
    fn flagged_with_matching_regex_exclude() {
        let request = CoverageRequest::get("/resources/ui5/customlib/test/MyTest.js")
            .with_query("instrument", "true");
        let excludes = [pattern(r"/resources/((ui5/customlib/test/([^/]+[/])*[^/]*))(-dbg)?\.js$")];

        assert!(!should_instrument_resource(&request, &excludes));
    }

    #[test]
    fn flagged_with_matching_plain_exclude() {
        let request = CoverageRequest::get("/resources/ui5/customlib/test/MyTest.js")
            .with_query("instrument", "true");
        let excludes = [pattern(r"/resources/ui5/customlib/test/MyTest\.js")];

        assert!(!should_instrument_resource(&request, &excludes));
    }

    #[test]
    fn flagged_without_matching_excludes() {
        let request = CoverageRequest::get("/resources/ui5/customlib/src/Control1.js")
            .with_query("instrument", "true");
        let excludes = [
            pattern(r"/resources/((ui5/customlib/test/([^/]+[/])*[^/]*))(-dbg)?\.js$"),
            pattern(r"/resources/ui5/customlib/test/MyTest\.js"),
        ];

        assert!(should_instrument_resource(&request, &excludes));
    }

    #[test]
    fn non_js_is_rejected_regardless_of_flags() {
        for path in ["/resources/lib/Control.json", "/index.html", "/resources/lib/Control.js.map"] {
            let request = CoverageRequest::get(path).with_query("instrument", "true");
            assert!(!should_instrument_resource(&request, &[]));
        }
    }
}
