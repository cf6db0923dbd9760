use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;
use crate::template::Substitutions;

use super::{ConvertStep, qualified};

/// `Pack.*` → `model`.
///
/// With textures the model is generated from a parent template; without them
/// `Pack.model` is referenced as-is.
pub struct ModelStep;

enum Textures {
    None,
    /// `layer0`, `layer1`, ... in order.
    Layers(Vec<String>),
    /// Explicit texture slot names, e.g. `all` or `top`/`side`.
    Named(Section),
}

impl ConvertStep for ModelStep {
    fn name(&self) -> &'static str {
        "model"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(pack) = source.section("Pack") else {
            return Ok(());
        };
        let textures = textures(cx, pack)?;
        let explicit = pack.str_or("model", "");
        let generate = pack.bool_or("generate_model", !matches!(textures, Textures::None));

        let fragment = if generate {
            let model_path = if explicit.is_empty() {
                default_model_path(cx)
            } else {
                cx.ctx.resource_id(explicit)
            };
            generated(cx, pack, &model_path, textures)?
        } else if explicit.is_empty() {
            if matches!(textures, Textures::None) {
                return Ok(());
            }
            return Err(ConvertError::unsupported(
                "textures given with generate_model off and no model to reference",
            ));
        } else {
            let subs = Substitutions::new().with("%model_path%", cx.ctx.resource_id(explicit));
            cx.ctx.templates.render("default:model/reference", &subs)
        };
        target.set("model", fragment);
        Ok(())
    }
}

fn textures(cx: &EntryContext<'_>, pack: &Section) -> Result<Textures, ConvertError> {
    let shape = match pack.shape("textures") {
        Shape::Absent => pack.shape("texture"),
        shape => shape,
    };
    Ok(match shape {
        Shape::Absent => Textures::None,
        Shape::Scalar(node) => match node.scalar_string() {
            Some(t) => Textures::Layers(vec![cx.ctx.resource_id(&t)]),
            None => Textures::None,
        },
        Shape::Sequence(items) => {
            let layers: Vec<String> = items
                .iter()
                .filter_map(Node::scalar_string)
                .map(|t| cx.ctx.resource_id(&t))
                .collect();
            if layers.is_empty() {
                Textures::None
            } else {
                Textures::Layers(layers)
            }
        }
        Shape::Mapping(map) => {
            let mut named = Section::new();
            for (slot, path) in map.iter() {
                let path = path
                    .scalar_string()
                    .ok_or_else(|| ConvertError::malformed(format!("texture slot '{slot}' must be a path")))?;
                named.insert(slot, cx.ctx.resource_id(&path));
            }
            if named.is_empty() { Textures::None } else { Textures::Named(named) }
        }
    })
}

/// `"<file>:<key>"` → `"<file>:item/<key>"`.
fn default_model_path(cx: &EntryContext<'_>) -> String {
    match cx.id.split_once(':') {
        Some((ns, key)) => format!("{ns}:item/{key}"),
        None => format!("{}:item/{}", cx.settings().default_namespace, cx.id),
    }
}

fn generated(cx: &EntryContext<'_>, pack: &Section, model_path: &str, textures: Textures) -> Result<Node, ConvertError> {
    let first = match &textures {
        Textures::None => {
            return Err(ConvertError::malformed("generate_model set but no textures given"));
        }
        Textures::Layers(layers) => layers.first().cloned().unwrap_or_default(),
        Textures::Named(named) => named
            .iter()
            .find_map(|(_, v)| v.scalar_string())
            .unwrap_or_default(),
    };

    let raw_parent = pack.str_or("parent_model", "item/generated").trim().to_ascii_lowercase();
    let parent = raw_parent.strip_prefix("minecraft:").unwrap_or(&raw_parent);
    let template = match parent {
        "item/generated" => "default:model/generated",
        "item/handheld" => "default:model/handheld",
        "block/cube_all" => "default:model/cube_all",
        _ => "default:model/custom_parent",
    };
    let subs = Substitutions::new()
        .with("%model_path%", model_path)
        .with("%texture_path%", first)
        .with("%parent%", qualified(parent, "minecraft"));
    let mut fragment = cx.ctx.templates.render(template, &subs);

    if let Node::Map(model) = &mut fragment {
        match textures {
            Textures::Layers(layers) if layers.len() > 1 => {
                let slots = model.section_mut("generation.textures");
                for (index, layer) in layers.into_iter().enumerate().skip(1) {
                    slots.insert(format!("layer{index}"), layer);
                }
            }
            Textures::Named(named) => model.section_mut("generation").insert("textures", named),
            _ => {}
        }
    }
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    #[test]
    fn test_reference_model() {
        let ctx = context();
        let (t, _) = run(&ModelStep, &ctx, "Pack:\n  model: custom:item/wand\n");
        assert_eq!(t.str_or("model.type", ""), "minecraft:model");
        assert_eq!(t.str_or("model.path", ""), "custom:item/wand");
        assert!(t.lookup("model.generation").is_none());
    }

    #[test]
    fn test_generated_from_texture() {
        let ctx = context();
        let (t, _) = run(&ModelStep, &ctx, "Pack:\n  generate_model: true\n  texture: item/wand.png\n");
        assert_eq!(t.str_or("model.path", ""), "test:item/entry");
        assert_eq!(t.str_or("model.generation.parent", ""), "minecraft:item/generated");
        assert_eq!(t.str_or("model.generation.textures.layer0", ""), "minecraft:item/wand");
    }

    #[test]
    fn test_layers_and_parent() {
        let ctx = context();
        let (t, _) = run(
            &ModelStep,
            &ctx,
            "Pack:\n  parent_model: item/handheld\n  textures: [a, b]\n  model: x:item/y\n",
        );
        assert_eq!(t.str_or("model.path", ""), "x:item/y");
        assert_eq!(t.str_or("model.generation.parent", ""), "minecraft:item/handheld");
        assert_eq!(t.str_or("model.generation.textures.layer1", ""), "minecraft:b");
    }

    #[test]
    fn test_named_textures_custom_parent() {
        let ctx = context();
        let (t, _) = run(
            &ModelStep,
            &ctx,
            "Pack:\n  parent_model: block/cube_column\n  textures:\n    end: block/log_top\n    side: block/log\n",
        );
        assert_eq!(t.str_or("model.generation.parent", ""), "minecraft:block/cube_column");
        let slots = t.section("model.generation.textures").unwrap();
        assert_eq!(slots.keys().collect::<Vec<_>>(), vec!["end", "side"]);
    }

    #[test]
    fn test_no_pack_no_model() {
        let ctx = context();
        let (t, ok) = run(&ModelStep, &ctx, "Pack: {}\n");
        assert!(ok);
        assert!(t.is_empty());
        let (_, ok) = run(&ModelStep, &ctx, "Pack:\n  generate_model: false\n  texture: a\n");
        assert!(!ok);
    }
}
