use transmute_api::{ConvertError, Node, Section};

use crate::context::EntryContext;

use super::{ConvertStep, qualified};

/// Small `Components.*` values that map onto one data component each, plus
/// `custom_model_data`.
pub struct ComponentsStep;

impl ConvertStep for ComponentsStep {
    fn name(&self) -> &'static str {
        "components"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let custom_model_data = source
            .lookup("Pack.custom_model_data")
            .or_else(|| source.lookup("custom_model_data"))
            .and_then(Node::as_i64)
            .unwrap_or(0);
        target.set_unless("data.custom-model-data", custom_model_data, 0);

        let Some(components) = source.section("Components") else {
            return Ok(());
        };
        let mut out = Section::new();
        for (key, value) in components.iter() {
            let converted = match key {
                "max_stack_size" => max_stack_size(value),
                "rarity" => rarity(value),
                "fire_resistant" => flag(value, || {
                    Section::from_iter([("types".to_string(), Node::from("#minecraft:is_fire"))])
                })
                .map(|n| n.map(|n| ("damage_resistant", n))),
                "hide_tooltip" => flag(value, || {
                    Section::from_iter([("hide_tooltip".to_string(), Node::Bool(true))])
                })
                .map(|n| n.map(|n| ("tooltip_display", n))),
                "glider" => flag(value, Section::new).map(|n| n.map(|n| ("glider", n))),
                "item_model" => resource(cx, value).map(|n| Some(("item_model", n))),
                "tooltip_style" => resource(cx, value).map(|n| Some(("tooltip_style", n))),
                "enchantment_glint_override" => value
                    .as_bool()
                    .map(|b| Some(("enchantment_glint_override", Node::Bool(b))))
                    .ok_or_else(|| ConvertError::malformed("enchantment_glint_override must be a boolean")),
                "use_cooldown" => use_cooldown(cx, value),
                "jukebox_playable" => jukebox(value),
                // Handled by their own steps.
                "food" | "consumable" | "equippable" | "tool" | "durability" => continue,
                other => Err(ConvertError::unsupported(format!("component '{other}'"))),
            };
            match converted {
                Ok(Some((name, node))) => out.insert(format!("minecraft:{name}"), node),
                Ok(None) => {}
                Err(e) => tracing::warn!(id = %cx.id, component = %key, error = %e, "component skipped"),
            }
        }
        if !out.is_empty() {
            let data = target.section_mut("data.components");
            for (key, node) in out {
                data.insert(key, node);
            }
        }
        Ok(())
    }
}

type Converted = Result<Option<(&'static str, Node)>, ConvertError>;

fn max_stack_size(value: &Node) -> Converted {
    match value.as_i64() {
        Some(size @ 1..=99) => Ok(Some(("max_stack_size", Node::Int(size)))),
        _ => Err(ConvertError::malformed("max_stack_size must be between 1 and 99")),
    }
}

fn rarity(value: &Node) -> Converted {
    let raw = value.scalar_string().unwrap_or_default().to_ascii_lowercase();
    match raw.as_str() {
        "common" | "uncommon" | "rare" | "epic" => Ok(Some(("rarity", Node::Str(raw)))),
        _ => Err(ConvertError::malformed(format!("unknown rarity '{raw}'"))),
    }
}

/// Boolean switch: `true` writes the built component, `false` nothing.
fn flag(value: &Node, build: impl FnOnce() -> Section) -> Result<Option<Node>, ConvertError> {
    match value.as_bool() {
        Some(true) => Ok(Some(Node::Map(build()))),
        Some(false) => Ok(None),
        None => Err(ConvertError::malformed("expected a boolean")),
    }
}

fn resource(cx: &EntryContext<'_>, value: &Node) -> Result<Node, ConvertError> {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => Ok(Node::Str(cx.ctx.resource_id(s))),
        _ => Err(ConvertError::malformed("expected a resource id")),
    }
}

fn use_cooldown(cx: &EntryContext<'_>, value: &Node) -> Converted {
    let source = value
        .as_section()
        .ok_or_else(|| ConvertError::malformed("use_cooldown must be a map"))?;
    let seconds = source.f64_or("seconds", 0.0);
    if seconds <= 0.0 {
        return Err(ConvertError::malformed("use_cooldown needs positive seconds"));
    }
    let mut out = Section::new();
    out.insert("seconds", seconds);
    let group = source.str_or("group", "");
    if !group.is_empty() {
        out.insert("cooldown_group", cx.ctx.resource_id(group));
    }
    Ok(Some(("use_cooldown", Node::Map(out))))
}

fn jukebox(value: &Node) -> Converted {
    let song = match value {
        Node::Map(m) => m.str_or("song_key", m.str_or("song", "")).to_string(),
        other => other.scalar_string().unwrap_or_default(),
    };
    if song.trim().is_empty() {
        return Err(ConvertError::malformed("jukebox_playable needs a song"));
    }
    let mut out = Section::new();
    out.insert("song", qualified(&song, "minecraft"));
    Ok(Some(("jukebox_playable", Node::Map(out))))
}
