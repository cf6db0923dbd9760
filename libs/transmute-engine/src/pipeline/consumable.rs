use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;

use super::{ConvertStep, qualified};

const FOOD: &str = "data.components.minecraft:food";
const CONSUMABLE: &str = "data.components.minecraft:consumable";

/// `Components.food` and `Components.consumable` → the matching data
/// components.
///
/// Consume effects may be given as a map keyed by effect type or as a list of
/// maps carrying a `type` field.
pub struct ConsumableStep;

impl ConvertStep for ConsumableStep {
    fn name(&self) -> &'static str {
        "consumable"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        if let Some(food) = source.section("Components.food") {
            let nutrition = food.i64_or("nutrition", 0);
            if nutrition < 0 {
                return Err(ConvertError::malformed(format!("negative nutrition {nutrition}")));
            }
            let out = food_section(target);
            out.insert("nutrition", nutrition);
            out.insert("saturation", food.f64_or("saturation", 0.0));
            if food.bool_or("can_always_eat", false) {
                out.insert("can_always_eat", true);
            }
        }

        let Some(consumable) = source.section("Components.consumable") else {
            return Ok(());
        };
        let seconds = consumable.f64_or("consume_seconds", 1.6);
        if seconds < 0.0 {
            return Err(ConvertError::malformed(format!("negative consume_seconds {seconds}")));
        }

        let effects = consume_effects(cx, consumable)?;
        let out = consumable_section(target);
        out.set_unless("consume_seconds", seconds, 1.6);
        out.set_unless(
            "animation",
            consumable.str_or("animation", "eat").to_ascii_lowercase(),
            "eat".to_string(),
        );
        let sound = consumable.str_or("sound", "");
        if !sound.is_empty() {
            out.insert("sound", qualified(sound, "minecraft"));
        }
        out.set_unless(
            "has_consume_particles",
            consumable.bool_or("has_consume_particles", true),
            true,
        );
        if !effects.is_empty() {
            out.insert("on_consume_effects", effects);
        }
        Ok(())
    }
}

// The component keys contain a colon but no dot, so `section_mut` takes them
// as single path segments.
fn food_section(target: &mut Section) -> &mut Section {
    target.section_mut(FOOD)
}

fn consumable_section(target: &mut Section) -> &mut Section {
    target.section_mut(CONSUMABLE)
}

fn consume_effects(cx: &EntryContext<'_>, consumable: &Section) -> Result<Vec<Node>, ConvertError> {
    let mut out = Vec::new();
    match consumable.shape("effects") {
        Shape::Absent => {}
        Shape::Mapping(map) => {
            for (kind, body) in map.iter() {
                let empty = Section::new();
                let body = body.as_section().unwrap_or(&empty);
                push_effect(cx, &mut out, kind, body);
            }
        }
        Shape::Sequence(items) => {
            for item in items {
                match item.as_section() {
                    Some(body) => push_effect(cx, &mut out, body.str_or("type", ""), body),
                    None => tracing::warn!(id = %cx.id, "consume effect must be a map, skipped"),
                }
            }
        }
        Shape::Scalar(_) => {
            return Err(ConvertError::malformed("consumable effects must be a map or a list"));
        }
    }
    Ok(out)
}

fn push_effect(cx: &EntryContext<'_>, out: &mut Vec<Node>, kind: &str, body: &Section) {
    match consume_effect(kind, body) {
        Ok(node) => out.push(node),
        Err(e) => tracing::warn!(id = %cx.id, effect = %kind, error = %e, "consume effect skipped"),
    }
}

fn consume_effect(kind: &str, body: &Section) -> Result<Node, ConvertError> {
    let mut out = Section::new();
    match kind.trim().to_ascii_uppercase().as_str() {
        "APPLY_EFFECTS" => {
            out.insert("type", "minecraft:apply_effects");
            let effects = potion_effects(body)?;
            if effects.is_empty() {
                return Err(ConvertError::malformed("apply_effects without effects"));
            }
            out.insert("effects", effects);
            out.set_unless("probability", body.f64_or("probability", 1.0), 1.0);
        }
        "REMOVE_EFFECTS" => {
            out.insert("type", "minecraft:remove_effects");
            let ids: Vec<String> = body
                .string_list("effects")
                .iter()
                .map(|e| qualified(e, "minecraft"))
                .collect();
            if ids.is_empty() {
                return Err(ConvertError::malformed("remove_effects without effects"));
            }
            out.insert("effects", ids);
        }
        "CLEAR_ALL_EFFECTS" => out.insert("type", "minecraft:clear_all_effects"),
        "TELEPORT_RANDOMLY" => {
            out.insert("type", "minecraft:teleport_randomly");
            out.set_unless("diameter", body.f64_or("diameter", 16.0), 16.0);
        }
        "PLAY_SOUND" => {
            let sound = body.str_or("sound", "");
            if sound.is_empty() {
                return Err(ConvertError::malformed("play_sound without sound"));
            }
            out.insert("type", "minecraft:play_sound");
            out.insert("sound", qualified(sound, "minecraft"));
        }
        other => {
            return Err(ConvertError::unsupported(format!("consume effect type '{other}'")));
        }
    }
    Ok(Node::Map(out))
}

/// `effects: {speed: {duration: 200, amplifier: 1}}` → list of effect
/// instances with defaults omitted.
fn potion_effects(body: &Section) -> Result<Vec<Node>, ConvertError> {
    let Some(effects) = body.section("effects") else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for (name, params) in effects.iter() {
        let empty = Section::new();
        let params = params.as_section().unwrap_or(&empty);
        let mut effect = Section::new();
        effect.insert("id", qualified(name, "minecraft"));
        effect.set_unless("duration", params.i64_or("duration", 1), 1);
        effect.set_unless("amplifier", params.i64_or("amplifier", 0), 0);
        effect.set_unless("ambient", params.bool_or("ambient", false), false);
        effect.set_unless("show_particles", params.bool_or("show_particles", true), true);
        effect.set_unless("show_icon", params.bool_or("show_icon", true), true);
        out.push(Node::Map(effect));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    fn component<'a>(t: &'a Section, name: &str) -> &'a Section {
        t.section("data.components")
            .and_then(|c| c.get(name))
            .and_then(Node::as_section)
            .unwrap()
    }

    #[test]
    fn test_food() {
        let ctx = context();
        let (t, ok) = run(
            &ConsumableStep,
            &ctx,
            "Components:\n  food:\n    nutrition: 4\n    saturation: 2.5\n",
        );
        assert!(ok);
        let food = component(&t, "minecraft:food");
        assert_eq!(food.i64_or("nutrition", 0), 4);
        assert_eq!(food.f64_or("saturation", 0.0), 2.5);
        assert!(food.get("can_always_eat").is_none());
    }

    #[test]
    fn test_consumable_defaults_are_sparse() {
        let ctx = context();
        let (t, _) = run(
            &ConsumableStep,
            &ctx,
            "Components:\n  consumable:\n    consume_seconds: 1.6\n    animation: EAT\n",
        );
        assert!(component(&t, "minecraft:consumable").is_empty());
    }

    #[test]
    fn test_effects_map_form() {
        let ctx = context();
        let src = r#"
Components:
  consumable:
    animation: DRINK
    effects:
      APPLY_EFFECTS:
        effects:
          speed: {duration: 200, amplifier: 1}
        probability: 0.5
      CLEAR_ALL_EFFECTS: {}
      EXPLODE: {}
"#;
        let (t, ok) = run(&ConsumableStep, &ctx, src);
        assert!(ok);
        let c = component(&t, "minecraft:consumable");
        assert_eq!(c.str_or("animation", ""), "drink");
        let effects = c.get("on_consume_effects").and_then(Node::as_list).unwrap();
        assert_eq!(effects.len(), 2);
        let apply = effects[0].as_section().unwrap();
        assert_eq!(apply.f64_or("probability", 1.0), 0.5);
        let speed = apply.get("effects").and_then(Node::as_list).unwrap()[0]
            .as_section()
            .unwrap();
        assert_eq!(speed.str_or("id", ""), "minecraft:speed");
        assert_eq!(speed.i64_or("duration", 0), 200);
        assert!(speed.get("show_icon").is_none());
    }

    #[test]
    fn test_effects_list_form() {
        let ctx = context();
        let src = r#"
Components:
  consumable:
    effects:
      - type: REMOVE_EFFECTS
        effects: [poison, wither]
      - type: PLAY_SOUND
        sound: entity.player.burp
"#;
        let (t, _) = run(&ConsumableStep, &ctx, src);
        let effects = component(&t, "minecraft:consumable")
            .get("on_consume_effects")
            .and_then(Node::as_list)
            .unwrap();
        assert_eq!(
            effects[0].as_section().unwrap().string_list("effects"),
            vec!["minecraft:poison", "minecraft:wither"]
        );
        assert_eq!(
            effects[1].as_section().unwrap().str_or("sound", ""),
            "minecraft:entity.player.burp"
        );
    }
}
