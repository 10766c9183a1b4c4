use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "path": { "type": "string" },
            "exclude": { "type": "array", "items": { "type": "string" } },
            "cvss_threshold": { "type": "number", "minimum": 0.0, "maximum": 10.0 },
            "skip_tidy": { "type": "boolean" },
            "dry_run": { "type": "boolean" },
            "allow_major": { "type": "boolean" },
            "skip_db_update": { "type": "boolean" },
            "generate_vex": { "type": "boolean" },
            "vex_output": { "type": "string" },
            "ai": {
                "type": "object",
                "properties": {
                    "api_key": { "type": "string" },
                    "endpoint": { "type": "string", "format": "uri" },
                    "model": { "type": "string" }
                }
            }
        },
        "additionalProperties": false
    })
});
