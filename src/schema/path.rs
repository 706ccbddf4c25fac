use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex"));

/// Names of the `{name}` placeholders in `template`, in order.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Substitute path parameters into a template: `/todos/{id}` + `{id: 7}` -> `/todos/7`.
///
/// `params` must serialize to an object (or to `null`/unit for templates
/// without placeholders). Strings are inserted verbatim, other scalars by
/// their JSON form. A placeholder left unfilled (missing key or `null`
/// value) is an error.
pub fn fill_path<T: Serialize + ?Sized>(template: &str, params: &T) -> Result<String> {
    let value = serde_json::to_value(params)?;
    let mut values: HashMap<String, String> = HashMap::new();

    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) => s,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(Error::validation_with_context(
                            "path parameters must be scalar values",
                            ErrorContext::new()
                                .with_field_path(format!("path.{}", key))
                                .with_details(other.to_string())
                                .with_source("path_template"),
                        ))
                    }
                };
                values.insert(key, rendered);
            }
        }
        other => {
            return Err(Error::validation_with_context(
                "path parameters must serialize to an object",
                ErrorContext::new()
                    .with_details(other.to_string())
                    .with_source("path_template"),
            ))
        }
    }

    if let Some(missing) = placeholders(template)
        .into_iter()
        .find(|name| !values.contains_key(*name))
    {
        return Err(Error::validation_with_context(
            format!("missing value for path parameter '{}' in {}", missing, template),
            ErrorContext::new()
                .with_field_path(format!("path.{}", missing))
                .with_source("path_template"),
        ));
    }

    // One pass over the template, so substituted values are never rescanned.
    let path = PLACEHOLDER.replace_all(template, |caps: &Captures| {
        values.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(path.into_owned())
}
