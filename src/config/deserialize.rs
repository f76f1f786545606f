// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Validates API server URLs at load time.

use serde::Deserialize;

fn check_server(url: String) -> Result<String, String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| format!("server must be an http(s) URL, got {:?}", url))?;
    if rest.trim_end_matches('/').is_empty() {
        return Err(format!("server URL {:?} has no host", url));
    }
    Ok(url)
}

pub fn deserialize_server<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    check_server(s).map_err(serde::de::Error::custom)
}

pub fn deserialize_server_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(check_server)
        .transpose()
        .map_err(serde::de::Error::custom)
}
