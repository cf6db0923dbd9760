use transmute_api::{ConvertError, Node, Section};

use crate::context::EntryContext;
use crate::template::Substitutions;

use super::ConvertStep;

/// `Mechanics.custom_block` → `behavior` of type `block_item`.
///
/// The block state carries the item model built earlier in the pipeline,
/// generation included; `custom_block.model` overrides it with a reference.
pub struct BlockStep;

impl ConvertStep for BlockStep {
    fn name(&self) -> &'static str {
        "block"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(block) = source.section("Mechanics.custom_block") else {
            return Ok(());
        };
        if target.contains_key("behavior") {
            return Err(ConvertError::unsupported("entry already has a behavior"));
        }

        let raw_type = block.str_or("type", "NOTEBLOCK");
        let auto_state = auto_state(raw_type)
            .ok_or_else(|| ConvertError::unsupported(format!("custom block type '{raw_type}'")))?;

        let explicit = block.str_or("model", "");
        let built = match explicit {
            "" => target.section("model").cloned(),
            _ => None,
        };
        let model_path = match &built {
            Some(model) => model.str_or("path", "").to_string(),
            None if !explicit.is_empty() => cx.ctx.resource_id(explicit),
            None => String::new(),
        };
        if model_path.is_empty() {
            return Err(ConvertError::unsupported("custom block has no model"));
        }

        let subs = Substitutions::new()
            .with("%auto_state%", auto_state)
            .with("%model_path%", model_path);
        let mut state = cx.ctx.templates.render("default:block/state", &subs);
        if let (Node::Map(fields), Some(model)) = (&mut state, built) {
            fields.insert("model", model);
        }

        let behavior = target.section_mut("behavior");
        behavior.insert("type", "block_item");
        let out = behavior.section_mut("block");
        let settings = out.section_mut("settings");
        settings.set_unless("hardness", block.f64_or("hardness", 1.0), 1.0);
        settings.set_unless("resistance", block.f64_or("blast_resistance", 1.0), 1.0);
        settings.set_unless("luminance", block.i64_or("light_level", 0), 0);
        out.insert("state", state);
        Ok(())
    }
}

fn auto_state(raw: &str) -> Option<&'static str> {
    Some(match raw.trim().to_ascii_uppercase().as_str() {
        "NOTEBLOCK" | "NOTE_BLOCK" => "note_block",
        "STRINGBLOCK" | "STRING_BLOCK" => "tripwire",
        "CHORUSBLOCK" | "CHORUS_BLOCK" => "chorus_plant",
        _ => return None,
    })
}
