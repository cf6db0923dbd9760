use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;

use super::{ConvertStep, qualified};

/// `Components.tool` → `data.components."minecraft:tool"`.
///
/// A rule names its blocks through `material`/`materials` or `tag`/`tags`.
/// A single tag is written as `#namespace:tag`, anything else as a list.
pub struct ToolStep;

impl ConvertStep for ToolStep {
    fn name(&self) -> &'static str {
        "tool"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(tool) = source.section("Components.tool") else {
            return Ok(());
        };
        let mut rules = Vec::new();
        match tool.shape("rules") {
            Shape::Absent => {}
            Shape::Sequence(items) => {
                for (index, item) in items.iter().enumerate() {
                    let rule = item
                        .as_section()
                        .ok_or_else(|| ConvertError::malformed("tool rule must be a map"))
                        .and_then(rule);
                    match rule {
                        Ok(rule) => rules.push(rule),
                        Err(e) => tracing::warn!(id = %cx.id, index, error = %e, "tool rule skipped"),
                    }
                }
            }
            _ => return Err(ConvertError::malformed("tool rules must be a list")),
        }

        let out = target.section_mut("data.components.minecraft:tool");
        out.insert("rules", rules);
        out.set_unless("default_mining_speed", tool.f64_or("default_mining_speed", 1.0), 1.0);
        out.set_unless("damage_per_block", tool.i64_or("damage_per_block", 1), 1);
        out.set_unless(
            "can_destroy_blocks_in_creative",
            tool.bool_or("can_destroy_blocks_in_creative", true),
            true,
        );
        Ok(())
    }
}

fn rule(source: &Section) -> Result<Node, ConvertError> {
    let mut blocks: Vec<String> = source
        .string_list("material")
        .into_iter()
        .chain(source.string_list("materials"))
        .map(|m| qualified(&m, "minecraft"))
        .collect();
    blocks.extend(
        source
            .string_list("tag")
            .into_iter()
            .chain(source.string_list("tags"))
            .map(|t| format!("#{}", qualified(t.trim_start_matches('#'), "minecraft"))),
    );
    if blocks.is_empty() {
        return Err(ConvertError::malformed("tool rule names no blocks"));
    }

    let mut out = Section::new();
    if blocks.len() == 1 {
        out.insert("blocks", blocks.remove(0));
    } else {
        out.insert("blocks", blocks);
    }
    if let Some(speed) = source.lookup("speed").and_then(Node::as_f64) {
        out.insert("speed", speed);
    }
    if let Some(drops) = source.lookup("correct_for_drops").and_then(Node::as_bool) {
        out.insert("correct_for_drops", drops);
    }
    Ok(Node::Map(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    fn tool(t: &Section) -> &Section {
        t.section("data.components")
            .and_then(|c| c.get("minecraft:tool"))
            .and_then(Node::as_section)
            .unwrap()
    }

    #[test]
    fn test_tool_rules() {
        let ctx = context();
        let src = r#"
Components:
  tool:
    default_mining_speed: 2.0
    rules:
      - tag: mineable/pickaxe
        speed: 8.0
        correct_for_drops: true
      - materials: [STONE, minecraft:DIRT]
        speed: 4
      - speed: 1.0
"#;
        let (t, ok) = run(&ToolStep, &ctx, src);
        assert!(ok);
        let tool = tool(&t);
        assert_eq!(tool.f64_or("default_mining_speed", 0.0), 2.0);
        assert!(tool.get("damage_per_block").is_none());
        let rules = tool.get("rules").and_then(Node::as_list).unwrap();
        assert_eq!(rules.len(), 2);
        let first = rules[0].as_section().unwrap();
        assert_eq!(first.str_or("blocks", ""), "#minecraft:mineable/pickaxe");
        assert!(first.bool_or("correct_for_drops", false));
        assert_eq!(
            rules[1].as_section().unwrap().string_list("blocks"),
            vec!["minecraft:stone", "minecraft:dirt"]
        );
    }

    #[test]
    fn test_tool_without_rules() {
        let ctx = context();
        let (t, _) = run(&ToolStep, &ctx, "Components:\n  tool: {}\n");
        let rules = tool(&t).get("rules").and_then(Node::as_list).unwrap();
        assert!(rules.is_empty());
    }
}
