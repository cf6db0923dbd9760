use transmute_api::{ConvertError, Section};

use crate::context::EntryContext;

use super::{ConvertStep, qualified};

/// `Components.equippable` → `settings.equippable`.
pub struct EquippableStep;

impl ConvertStep for EquippableStep {
    fn name(&self) -> &'static str {
        "equippable"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(equippable) = source.section("Components.equippable") else {
            return Ok(());
        };
        let raw_slot = equippable.str_or("slot", "");
        let slot = slot(raw_slot)
            .ok_or_else(|| ConvertError::unsupported(format!("equipment slot '{raw_slot}'")))?;

        let out = target.section_mut("settings.equippable");
        out.insert("slot", slot);

        let asset = equippable.str_or("asset_id", equippable.str_or("model", ""));
        if !asset.is_empty() {
            out.insert("asset-id", cx.ctx.resource_id(asset));
        }
        let overlay = equippable.str_or("camera_overlay", "");
        if !overlay.is_empty() {
            out.insert("camera-overlay", cx.ctx.resource_id(overlay));
        }
        let sound = equippable.str_or("equip_sound", "");
        if !sound.is_empty() {
            out.insert("sound", qualified(sound, "minecraft"));
        }
        out.set_unless("dispensable", equippable.bool_or("dispensable", true), true);
        out.set_unless("swappable", equippable.bool_or("swappable", true), true);
        out.set_unless("damage-on-hurt", equippable.bool_or("damage_on_hurt", true), true);
        out.set_unless("equip-on-interact", equippable.bool_or("equip_on_interact", false), false);
        Ok(())
    }
}

fn slot(raw: &str) -> Option<&'static str> {
    Some(match raw.trim().to_ascii_uppercase().as_str() {
        "HEAD" => "head",
        "CHEST" => "chest",
        "LEGS" => "legs",
        "FEET" => "feet",
        "BODY" => "body",
        "SADDLE" => "saddle",
        "HAND" | "MAINHAND" => "mainhand",
        "OFFHAND" | "OFF_HAND" => "offhand",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    #[test]
    fn test_equippable() {
        let ctx = context();
        let (t, ok) = run(
            &EquippableStep,
            &ctx,
            "Components:\n  equippable:\n    slot: HEAD\n    model: custom:crown\n    swappable: false\n",
        );
        assert!(ok);
        let e = t.section("settings.equippable").unwrap();
        assert_eq!(e.str_or("slot", ""), "head");
        assert_eq!(e.str_or("asset-id", ""), "custom:crown");
        assert!(!e.bool_or("swappable", true));
        assert!(e.get("dispensable").is_none());
    }

    #[test]
    fn test_bad_slot_writes_nothing() {
        let ctx = context();
        let (t, ok) = run(&EquippableStep, &ctx, "Components:\n  equippable:\n    slot: TAIL\n");
        assert!(!ok);
        assert!(t.is_empty());
    }
}
