//! RGB colour downsampling for legacy hosts.
//!
//! Legacy hosts only understand the 16 named text colours. Components that
//! carry `#rrggbb` colours are rewritten to the nearest named colour before
//! they are handed to such a host.

use serde_json::Value;

/// The named colour palette, in protocol order.
pub const NAMED_COLORS: [(&str, (u8, u8, u8)); 16] = [
    ("black", (0x00, 0x00, 0x00)),
    ("dark_blue", (0x00, 0x00, 0xAA)),
    ("dark_green", (0x00, 0xAA, 0x00)),
    ("dark_aqua", (0x00, 0xAA, 0xAA)),
    ("dark_red", (0xAA, 0x00, 0x00)),
    ("dark_purple", (0xAA, 0x00, 0xAA)),
    ("gold", (0xFF, 0xAA, 0x00)),
    ("gray", (0xAA, 0xAA, 0xAA)),
    ("dark_gray", (0x55, 0x55, 0x55)),
    ("blue", (0x55, 0x55, 0xFF)),
    ("green", (0x55, 0xFF, 0x55)),
    ("aqua", (0x55, 0xFF, 0xFF)),
    ("red", (0xFF, 0x55, 0x55)),
    ("light_purple", (0xFF, 0x55, 0xFF)),
    ("yellow", (0xFF, 0xFF, 0x55)),
    ("white", (0xFF, 0xFF, 0xFF)),
];

/// Parse a `#rrggbb` string.
pub fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Nearest named colour to an RGB value (squared euclidean distance, first
/// entry wins ties).
pub fn nearest_named((r, g, b): (u8, u8, u8)) -> &'static str {
    let distance = |(nr, ng, nb): (u8, u8, u8)| {
        let dr = i32::from(r) - i32::from(nr);
        let dg = i32::from(g) - i32::from(ng);
        let db = i32::from(b) - i32::from(nb);
        dr * dr + dg * dg + db * db
    };

    NAMED_COLORS
        .iter()
        .min_by_key(|(_, rgb)| distance(*rgb))
        .map(|(name, _)| *name)
        .unwrap_or("white")
}

/// Rewrite every `#rrggbb` colour in a component tree to a named colour.
///
/// Walks `extra` and `with` children as well as bare arrays. Unparseable hex
/// strings are dropped so the legacy host falls back to the inherited colour.
pub fn downsample(component: &mut Value) {
    match component {
        Value::Array(children) => children.iter_mut().for_each(downsample),
        Value::Object(map) => {
            let replacement = match map.get("color").and_then(Value::as_str) {
                Some(color) if color.starts_with('#') => Some(parse_hex(color).map(nearest_named)),
                _ => None,
            };
            match replacement {
                Some(Some(named)) => {
                    map.insert("color".to_string(), Value::String(named.to_string()));
                }
                Some(None) => {
                    map.remove("color");
                }
                None => {}
            }

            for key in ["extra", "with"] {
                if let Some(children) = map.get_mut(key) {
                    downsample(children);
                }
            }
        }
        _ => {}
    }
}
