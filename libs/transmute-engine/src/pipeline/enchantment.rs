use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;

use super::{ConvertStep, qualified};

/// `enchantments` → `data.enchantment`.
///
/// Accepts a map of `name: level` or a list of `name:level` tokens. A bad
/// token drops that enchantment only.
pub struct EnchantmentStep;

impl ConvertStep for EnchantmentStep {
    fn name(&self) -> &'static str {
        "enchantment"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let parsed: Vec<Result<(String, i64), ConvertError>> = match source.shape("enchantments") {
            Shape::Absent => return Ok(()),
            Shape::Mapping(map) => map
                .iter()
                .map(|(name, level)| {
                    let level = level.as_i64().ok_or_else(|| {
                        ConvertError::malformed(format!("enchantment '{name}' has no numeric level"))
                    })?;
                    Ok((name.to_string(), level))
                })
                .collect(),
            Shape::Sequence(items) => items.iter().map(parse_token_node).collect(),
            Shape::Scalar(node) => vec![parse_token_node(node)],
        };

        let mut out = Section::new();
        for entry in parsed {
            match entry.and_then(|(name, level)| validate(&name, level)) {
                Ok((name, level)) => out.insert(name, level),
                Err(e) => tracing::warn!(id = %cx.id, error = %e, "enchantment skipped"),
            }
        }
        if !out.is_empty() {
            target.set("data.enchantment", out);
        }
        Ok(())
    }
}

fn parse_token_node(node: &Node) -> Result<(String, i64), ConvertError> {
    let token = node
        .scalar_string()
        .ok_or_else(|| ConvertError::malformed("enchantment list entries must be text"))?;
    parse_token(&token)
}

/// `"sharpness:5"`, `"minecraft:sharpness:5"`, `"sharpness 5"` or a bare name
/// (level 1).
fn parse_token(token: &str) -> Result<(String, i64), ConvertError> {
    let token = token.trim();
    let split = token
        .rsplit_once(':')
        .or_else(|| token.rsplit_once(' '))
        .filter(|(_, level)| level.trim().parse::<i64>().is_ok());
    match split {
        Some((name, level)) => {
            let level = level
                .trim()
                .parse()
                .map_err(|_| ConvertError::malformed(format!("bad enchantment level in '{token}'")))?;
            Ok((name.trim().to_string(), level))
        }
        None => Ok((token.to_string(), 1)),
    }
}

fn validate(name: &str, level: i64) -> Result<(String, i64), ConvertError> {
    if name.is_empty() {
        return Err(ConvertError::malformed("empty enchantment name"));
    }
    if !(1..=255).contains(&level) {
        return Err(ConvertError::malformed(format!(
            "enchantment '{name}' level {level} out of range"
        )));
    }
    Ok((qualified(name, "minecraft"), level))
}
