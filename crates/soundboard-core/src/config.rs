//! Host configuration rules — layered JSON merge and platform detection.
//!
//! The host keeps a system config and a user config; later layers override
//! earlier ones key by key, recursing into nested objects.

use serde_json::{Map, Value};

/// Platform value reported by Raspberry Pi based hosts.
pub const PICROFT: &str = "picroft";

/// Platform used when the config does not name one.
pub const UNKNOWN_PLATFORM: &str = "unknown";

/// Deep-merge `overlay` into `base`. Objects merge recursively, anything else
/// in the overlay replaces the base value.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Merge a sequence of config layers, lowest precedence first.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        merge(&mut merged, layer);
    }
    merged
}

/// Read `enclosure.platform`, falling back to [`UNKNOWN_PLATFORM`].
pub fn platform(config: &Value) -> String {
    config
        .get("enclosure")
        .and_then(|enclosure| enclosure.get("platform"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_PLATFORM)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn platform_from_enclosure() {
        let config = json!({ "enclosure": { "platform": "picroft" } });
        assert_eq!(platform(&config), "picroft");
    }

    #[test]
    fn platform_missing_enclosure() {
        assert_eq!(platform(&json!({ "lang": "en-us" })), "unknown");
    }

    #[test]
    fn platform_missing_key() {
        assert_eq!(platform(&json!({ "enclosure": {} })), "unknown");
    }

    #[test]
    fn platform_not_a_string() {
        assert_eq!(platform(&json!({ "enclosure": { "platform": 3 } })), "unknown");
    }

    #[test]
    fn merge_overrides_scalars() {
        let mut base = json!({ "lang": "en-us", "enclosure": { "platform": "mycroft_mark_1" } });
        merge(&mut base, json!({ "enclosure": { "platform": "picroft" } }));
        assert_eq!(base["enclosure"]["platform"], "picroft");
        assert_eq!(base["lang"], "en-us");
    }

    #[test]
    fn merge_keeps_sibling_keys() {
        let mut base = json!({ "enclosure": { "platform": "picroft", "port": "/dev/ttyAMA0" } });
        merge(&mut base, json!({ "enclosure": { "rate": 9600 } }));
        assert_eq!(base["enclosure"]["platform"], "picroft");
        assert_eq!(base["enclosure"]["port"], "/dev/ttyAMA0");
        assert_eq!(base["enclosure"]["rate"], 9600);
    }

    #[test]
    fn merge_layers_later_wins() {
        let merged = merge_layers([
            json!({ "enclosure": { "platform": "mycroft_mark_1" } }),
            json!({ "enclosure": { "platform": "picroft" } }),
        ]);
        assert_eq!(platform(&merged), "picroft");
    }

    #[test]
    fn merge_layers_empty() {
        assert_eq!(platform(&merge_layers([])), "unknown");
    }
}
