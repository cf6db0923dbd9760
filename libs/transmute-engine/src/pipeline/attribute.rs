use transmute_api::{ConvertError, Node, Section, Shape};

use crate::config::normalize_id;
use crate::context::EntryContext;

use super::ConvertStep;

/// `AttributeModifiers` → `data.attribute-modifiers`.
///
/// Source entries look like:
///
/// ```yaml
/// AttributeModifiers:
///   - attribute: GENERIC_ATTACK_DAMAGE
///     amount: 6
///     operation: ADD_NUMBER
///     slot: HAND
/// ```
pub struct AttributeStep;

impl ConvertStep for AttributeStep {
    fn name(&self) -> &'static str {
        "attribute"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let entries = match source.shape("AttributeModifiers") {
            Shape::Absent => return Ok(()),
            Shape::Sequence(items) => items,
            _ => return Err(ConvertError::malformed("AttributeModifiers must be a list")),
        };

        let mut modifiers = Vec::new();
        for (index, entry) in entries.iter().enumerate() {
            let converted = entry
                .as_section()
                .ok_or_else(|| ConvertError::malformed("modifier must be a map"))
                .and_then(|m| modifier(cx.id, index, m));
            match converted {
                Ok(node) => modifiers.push(node),
                Err(e) => tracing::warn!(id = %cx.id, index, error = %e, "attribute modifier skipped"),
            }
        }
        if !modifiers.is_empty() {
            target.set("data.attribute-modifiers", modifiers);
        }
        Ok(())
    }
}

fn modifier(owner: &str, index: usize, source: &Section) -> Result<Node, ConvertError> {
    let raw_attribute = source.str_or("attribute", "");
    let attribute = attribute_name(raw_attribute)
        .ok_or_else(|| ConvertError::malformed(format!("bad attribute '{raw_attribute}'")))?;
    let amount = source
        .lookup("amount")
        .and_then(Node::as_f64)
        .ok_or_else(|| ConvertError::malformed(format!("attribute '{attribute}' has no amount")))?;
    let raw_operation = source.str_or("operation", "ADD_NUMBER");
    let operation = operation(raw_operation)
        .ok_or_else(|| ConvertError::malformed(format!("unknown operation '{raw_operation}'")))?;

    let id = match source.lookup("id").or_else(|| source.lookup("key")) {
        Some(id) => id.scalar_string().unwrap_or_default().to_ascii_lowercase(),
        None => format!("{owner}_{attribute}_{index}"),
    };

    let mut out = Section::new();
    out.insert("id", id);
    out.insert("type", format!("minecraft:{attribute}"));
    out.insert("amount", amount);
    out.insert("operation", operation);
    let slot = source.str_or("slot", "");
    if !slot.is_empty() {
        match slot_group(slot) {
            Some("any") => {}
            Some(group) => out.insert("slot", group),
            None => tracing::warn!(slot, "unknown equipment slot, modifier applies to any slot"),
        }
    }
    Ok(Node::Map(out))
}

/// `GENERIC_ATTACK_DAMAGE`, `generic.attack_damage` and
/// `minecraft:attack_damage` all become `attack_damage`.
fn attribute_name(raw: &str) -> Option<String> {
    let lower = raw.trim().to_ascii_lowercase().replace('.', "_");
    let lower = lower.strip_prefix("minecraft:").unwrap_or(&lower);
    let bare = ["generic_", "player_", "zombie_", "horse_"]
        .iter()
        .find_map(|p| lower.strip_prefix(p))
        .unwrap_or(lower);
    normalize_id(bare)
}

fn operation(raw: &str) -> Option<&'static str> {
    Some(match raw.trim().to_ascii_uppercase().as_str() {
        "ADD_NUMBER" | "ADD_VALUE" => "add_value",
        "ADD_SCALAR" | "ADD_MULTIPLIED_BASE" => "add_multiplied_base",
        "MULTIPLY_SCALAR_1" | "ADD_MULTIPLIED_TOTAL" => "add_multiplied_total",
        _ => return None,
    })
}

fn slot_group(raw: &str) -> Option<&'static str> {
    Some(match raw.trim().to_ascii_uppercase().as_str() {
        "HAND" | "MAINHAND" | "MAIN_HAND" => "mainhand",
        "OFF_HAND" | "OFFHAND" => "offhand",
        "HEAD" => "head",
        "CHEST" => "chest",
        "LEGS" => "legs",
        "FEET" => "feet",
        "BODY" => "body",
        "ARMOR" => "armor",
        "ANY" => "any",
        _ => return None,
    })
}
