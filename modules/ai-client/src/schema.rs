use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Trait for types that can be requested as structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Schema with every `$ref` inlined and the draft metadata removed.
    /// Provider-neutral; see [`openai_schema`] and [`gemini_schema`].
    fn raw_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn openai_schema() -> Value {
        openai_schema(Self::raw_schema())
    }

    fn gemini_schema() -> Value {
        gemini_schema(Self::raw_schema())
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Shape a raw schema for OpenAI strict mode.
///
/// OpenAI requires `additionalProperties: false` on every object and ALL
/// properties listed in `required`, even nullable ones.
pub fn openai_schema(mut value: Value) -> Value {
    fix_object_schemas(&mut value);
    value
}

/// Shape a raw schema for Gemini's `responseSchema`.
///
/// Gemini accepts an OpenAPI subset: upper-case type names, `nullable`
/// instead of `["T", "null"]` unions, and no `additionalProperties`,
/// `title`, `format` or `default` keys.
pub fn gemini_schema(mut value: Value) -> Value {
    to_gemini(&mut value);
    value
}

fn fix_object_schemas(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.get("type") == Some(&Value::String("object".to_string())) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));

            if let Some(Value::Object(props)) = map.get("properties") {
                let all_keys: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();
                map.insert("required".to_string(), Value::Array(all_keys));
            }
        }

        for (_, v) in map.iter_mut() {
            fix_object_schemas(v);
        }
    } else if let Value::Array(arr) = value {
        for item in arr.iter_mut() {
            fix_object_schemas(item);
        }
    }
}

const GEMINI_DROPPED_KEYS: &[&str] = &["additionalProperties", "title", "format", "default", "$schema"];

fn to_gemini(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in GEMINI_DROPPED_KEYS {
                map.remove(*key);
            }

            collapse_nullable_any_of(map);

            if let Some(ty) = map.remove("type") {
                let (name, nullable) = gemini_type(&ty);
                if let Some(name) = name {
                    map.insert("type".to_string(), Value::String(name));
                }
                if nullable {
                    map.insert("nullable".to_string(), Value::Bool(true));
                }
            }

            // `properties` is keyed by field name: recurse into the values
            // only, so a field called e.g. "title" is not treated as a keyword.
            if let Some(Value::Object(props)) = map.get_mut("properties") {
                for (_, v) in props.iter_mut() {
                    to_gemini(v);
                }
            }

            for (key, v) in map.iter_mut() {
                if key != "properties" {
                    to_gemini(v);
                }
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                to_gemini(item);
            }
        }
        _ => {}
    }
}

/// `anyOf: [X, {type: null}]` → X with `nullable: true`.
fn collapse_nullable_any_of(map: &mut Map<String, Value>) {
    let Some(Value::Array(variants)) = map.get("anyOf") else {
        return;
    };
    if variants.len() != 2 {
        return;
    }

    let is_null = |v: &Value| v.get("type") == Some(&Value::String("null".to_string()));
    let Some(inner) = variants.iter().find(|v| !is_null(v)).cloned() else {
        return;
    };
    if !variants.iter().any(is_null) {
        return;
    }

    map.remove("anyOf");
    if let Value::Object(inner) = inner {
        for (k, v) in inner {
            map.entry(k).or_insert(v);
        }
    }
    map.insert("nullable".to_string(), Value::Bool(true));
}

/// Map a JSON-schema `type` (string or union array) to Gemini's upper-case
/// name plus a nullability flag.
fn gemini_type(ty: &Value) -> (Option<String>, bool) {
    match ty {
        Value::String(s) => (Some(s.to_ascii_uppercase()), false),
        Value::Array(items) => {
            let mut name = None;
            let mut nullable = false;
            for item in items.iter().filter_map(Value::as_str) {
                if item == "null" {
                    nullable = true;
                } else if name.is_none() {
                    name = Some(item.to_ascii_uppercase());
                }
            }
            (name, nullable)
        }
        _ => (None, false),
    }
}

fn inline_refs(value: &mut Value) {
    let definitions = if let Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        let mut inlined = def.clone();
                        // Keep a field-level description attached to the $ref.
                        if let (Some(desc), Value::Object(target)) = (map.get("description"), &mut inlined) {
                            target.insert("description".to_string(), desc.clone());
                        }
                        *value = inlined;
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [single] = all_of.as_slice() {
                    let description = map.get("description").cloned();
                    *value = single.clone();
                    if let (Some(desc), Value::Object(target)) = (description, &mut *value) {
                        target.entry("description".to_string()).or_insert(desc);
                    }
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    enum Tier {
        Low,
        High,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Party {
        name: String,
        role: String,
    }

    #[derive(Deserialize, JsonSchema)]
    #[allow(dead_code)]
    #[serde(rename_all = "camelCase")]
    struct Report {
        title: String,
        /// How bad it is
        tier: Tier,
        credibility_score: f64,
        parties: Vec<Party>,
        note: Option<String>,
    }

    #[test]
    fn test_raw_schema_has_no_refs() {
        let schema = Report::raw_schema();
        let text = serde_json::to_string(&schema).unwrap();
        assert!(!text.contains("$ref"));
        assert!(!text.contains("definitions"));
        assert!(!text.contains("$schema"));
    }

    #[test]
    fn test_openai_requires_every_property() {
        let schema = Report::openai_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();

        assert!(required.contains(&"note"));
        assert!(required.contains(&"credibilityScore"));
        assert_eq!(schema["additionalProperties"], Value::Bool(false));

        let party = &schema["properties"]["parties"]["items"];
        assert_eq!(party["additionalProperties"], Value::Bool(false));
    }

    #[test]
    fn test_gemini_uppercases_types() {
        let schema = Report::gemini_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["title"]["type"], "STRING");
        assert_eq!(schema["properties"]["parties"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["parties"]["items"]["type"], "OBJECT");
        assert_eq!(schema["properties"]["credibilityScore"]["type"], "NUMBER");
    }

    #[test]
    fn test_gemini_nullable_and_dropped_keys() {
        let schema = Report::gemini_schema();
        let note = &schema["properties"]["note"];
        assert_eq!(note["type"], "STRING");
        assert_eq!(note["nullable"], Value::Bool(true));

        let text = serde_json::to_string(&schema).unwrap();
        assert!(!text.contains("additionalProperties"));
        assert!(!text.contains("\"format\""));
        // The "title" property survives even though the keyword is dropped.
        assert!(schema["properties"].get("title").is_some());
    }

    #[test]
    fn test_enum_inlined_with_description() {
        let schema = Report::gemini_schema();
        let tier = &schema["properties"]["tier"];
        assert_eq!(tier["type"], "STRING");
        assert_eq!(tier["description"], "How bad it is");
        let values: Vec<&str> = tier["enum"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(values, vec!["Low", "High"]);
    }
}
