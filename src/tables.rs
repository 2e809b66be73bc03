use std::collections::HashMap;

use crate::error::Error;

/// Symbolic key name -> key code. Names are upper-cased on load.
pub type KeyTable = HashMap<String, u8>;
/// Character class code -> ordered key names needed to type the character.
pub type LayoutTable = HashMap<String, Vec<String>>;

/// Built-in default key table, USB HID usage ids.
pub const DEFAULT_KEYS: &str = include_str!("../resources/default.json");

const US_LAYOUT: &str = include_str!("../resources/us.json");

/// Layout tables shipped with the binary, by name.
pub fn builtin_layout(name: &str) -> Option<&'static str> {
    match name {
        "us" => Some(US_LAYOUT),
        _ => None,
    }
}

/// Parse both tables. Either both load or neither does.
pub fn load(default_src: &str, layout_src: &str) -> Result<(KeyTable, LayoutTable), Error> {
    let keys: KeyTable = serde_json::from_str(default_src)
        .map_err(|e| Error::Config(format!("invalid default key table, {}", e)))?;
    let keys = keys
        .into_iter()
        .map(|(name, code)| (name.to_uppercase(), code))
        .collect();

    let layout: LayoutTable = serde_json::from_str(layout_src)
        .map_err(|e| Error::Config(format!("invalid layout table, {}", e)))?;

    Ok((keys, layout))
}
