//! Defaults and deep merging of caller options.

use search_plugin_shared::DEFAULT_HOST;
use serde_json::{json, Value};

/// Options applied underneath whatever the caller supplies.
pub fn defaults() -> Value {
    json!({
        "indices": [],
        "configuration": {
            "host": DEFAULT_HOST
        }
    })
}

/// Deep merge `options` over a copy of `defaults`.
///
/// Objects merge key by key; arrays and scalars from `options` replace the
/// default outright. A `null` in `options` leaves the default in place.
pub fn apply_to_defaults(defaults: &Value, options: &Value) -> Value {
    let mut merged = defaults.clone();
    merge_into(&mut merged, options);
    merged
}

/// Merge caller options over the plugin defaults.
///
/// The default `host` is only applied when the caller does not configure
/// `hosts`, otherwise every multi-node configuration would trip the
/// `host`/`hosts` exclusion.
pub fn merge_options(options: &Value) -> Value {
    let mut base = defaults();
    let supplies_hosts = options
        .pointer("/configuration/hosts")
        .is_some_and(|hosts| !hosts.is_null());

    if supplies_hosts {
        if let Some(configuration) = base.get_mut("configuration").and_then(Value::as_object_mut) {
            configuration.remove("host");
        }
    }

    apply_to_defaults(&base, options)
}

fn merge_into(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                if value.is_null() {
                    continue;
                }
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_into(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => {
            if !source.is_null() {
                *target = source.clone();
            }
        }
    }
}
