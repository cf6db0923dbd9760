use transmute_api::{ConvertError, Node, Section};

use crate::context::EntryContext;

use super::{ConvertStep, target_material};

/// `color` → `data.dyed-color` or `data.potion-color`, depending on what the
/// material can carry.
pub struct ColorStep;

impl ConvertStep for ColorStep {
    fn name(&self) -> &'static str {
        "color"
    }

    fn convert(&self, _cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(raw) = source.lookup("color") else {
            return Ok(());
        };
        let rgb = parse_color(raw)?;
        let material = target_material(target);
        let key = if is_dyeable(material) {
            "data.dyed-color"
        } else if is_potion(material) {
            "data.potion-color"
        } else {
            return Err(ConvertError::unsupported(format!(
                "color on material '{material}' has no target representation"
            )));
        };
        target.set(key, rgb);
        Ok(())
    }
}

fn is_dyeable(material: &str) -> bool {
    material.starts_with("leather_") || material == "wolf_armor"
}

fn is_potion(material: &str) -> bool {
    matches!(
        material,
        "potion" | "splash_potion" | "lingering_potion" | "tipped_arrow"
    )
}

/// `"255, 0, 0"`, `"#ff0000"` or a packed integer → packed RGB.
fn parse_color(raw: &Node) -> Result<i64, ConvertError> {
    if let Node::Int(v) = raw {
        return if (0..=0xFF_FFFF).contains(v) {
            Ok(*v)
        } else {
            Err(ConvertError::malformed(format!("color {v} out of range")))
        };
    }
    let text = raw
        .scalar_string()
        .ok_or_else(|| ConvertError::malformed("color must be a scalar"))?;
    let text = text.trim();

    if let Some(hex) = text.strip_prefix('#') {
        return i64::from_str_radix(hex, 16)
            .ok()
            .filter(|_| hex.len() == 6)
            .ok_or_else(|| ConvertError::malformed(format!("bad hex color '{text}'")));
    }

    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ConvertError::malformed(format!("expected 'r,g,b', got '{text}'")));
    }
    let mut rgb = 0i64;
    for part in parts {
        let channel: u8 = part
            .parse()
            .map_err(|_| ConvertError::malformed(format!("bad color channel '{part}' in '{text}'")))?;
        rgb = (rgb << 8) | i64::from(channel);
    }
    Ok(rgb)
}
