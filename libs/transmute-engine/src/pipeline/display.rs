use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;
use crate::text::{display_text, legacy_to_minimessage};

use super::ConvertStep;

/// `itemname` → `data.item-name`, `displayname` → `data.display-name`.
///
/// Item names render upright by default; custom display names inherit
/// italics, so only they get the configured suppression.
pub struct DisplayNameStep;

impl ConvertStep for DisplayNameStep {
    fn name(&self) -> &'static str {
        "display"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let item_name = source.str_or("itemname", "");
        if !item_name.is_empty() {
            target.set("data.item-name", legacy_to_minimessage(item_name));
        }
        let display_name = source.str_or("displayname", "");
        if !display_name.is_empty() {
            target.set(
                "data.display-name",
                display_text(display_name, cx.settings().disable_italic),
            );
        }
        Ok(())
    }
}

/// `lore` (one string or a list) → `data.lore`.
pub struct LoreStep;

impl ConvertStep for LoreStep {
    fn name(&self) -> &'static str {
        "lore"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let disable_italic = cx.settings().disable_italic;
        let lines: Vec<String> = match source.shape("lore") {
            Shape::Absent => return Ok(()),
            Shape::Scalar(node) => node.scalar_string().into_iter().collect(),
            Shape::Sequence(items) => items
                .iter()
                .map(|n| n.scalar_string().unwrap_or_default())
                .collect(),
            Shape::Mapping(_) => {
                return Err(ConvertError::unsupported("lore must be text or a list of text"));
            }
        };
        if lines.is_empty() {
            return Ok(());
        }
        let converted: Vec<Node> = lines
            .iter()
            .map(|l| Node::Str(display_text(l, disable_italic)))
            .collect();
        target.set("data.lore", converted);
        Ok(())
    }
}
