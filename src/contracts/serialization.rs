// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use serde::{Deserialize, Deserializer};

// Deserializes an empty string as `None` rather than `Some(String::new())`.
//
// The tunnel service sometimes serializes an absent optional string field as
// `""` instead of omitting it, which would otherwise round-trip into a
// present-but-empty value.
pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default, deserialize_with = "super::empty_string_as_none")]
        value: Option<String>,
    }

    #[test]
    fn empty_string_becomes_none() {
        let w: Wrapper = serde_json::from_str(r#"{"value":""}"#).unwrap();
        assert_eq!(w.value, None);
    }

    #[test]
    fn non_empty_string_is_preserved() {
        let w: Wrapper = serde_json::from_str(r#"{"value":"hi"}"#).unwrap();
        assert_eq!(w.value, Some("hi".to_string()));
    }

    #[test]
    fn missing_field_defaults_to_none() {
        let w: Wrapper = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(w.value, None);
    }
}
