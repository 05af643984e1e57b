use serde::de::IntoDeserializer as _;
use serde::{Deserialize, Deserializer};

pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    if let Some(str) = Option::<String>::deserialize(deserializer)? {
        let str = str.trim();
        if str.is_empty() {
            Ok(None)
        } else {
            T::deserialize(str.into_deserializer()).map(Some)
        }
    } else {
        Ok(None)
    }
}

pub(crate) fn trim_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(String::deserialize(deserializer)?.trim().to_owned())
}
