use transmute_api::{ConvertError, Node, Section, Shape};

use crate::context::EntryContext;
use crate::geometry::{self, HitboxTokens};
use crate::template::Substitutions;

use super::ConvertStep;

/// `Mechanics.furniture` → `behavior` of type `furniture_item`.
///
/// Every allowed placement (ground, wall, ceiling) gets the same display
/// element and hitbox list.
pub struct FurnitureStep;

impl ConvertStep for FurnitureStep {
    fn name(&self) -> &'static str {
        "furniture"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        let Some(furniture) = source.section("Mechanics.furniture") else {
            return Ok(());
        };
        if target.contains_key("behavior") {
            return Err(ConvertError::unsupported("entry already has a behavior"));
        }

        let mut tokens = HitboxTokens {
            barriers: furniture.string_list("hitbox.barriers"),
            shulkers: furniture.string_list("hitbox.shulkers"),
            ghasts: furniture.string_list("hitbox.ghasts"),
            interactions: furniture.string_list("hitbox.interactions"),
        };
        if tokens.barriers.is_empty() && furniture.bool_or("barrier", false) {
            tokens.barriers.push("0,0,0".to_string());
        }
        let hitboxes: Vec<Node> = geometry::decode(&tokens, seat(furniture), cx.id)
            .iter()
            .map(|h| h.to_node())
            .collect();

        let element = cx
            .ctx
            .templates
            .render("default:furniture/element", &Substitutions::new().with("%item%", cx.id));

        let mut placement = Section::new();
        if !furniture.bool_or("rotatable", true) {
            placement.set("rules.rotation", "NONE");
        }
        placement.insert("elements", vec![element]);
        if !hitboxes.is_empty() {
            placement.insert("hitboxes", hitboxes);
        }

        let placements = allowed_placements(furniture);
        if placements.is_empty() {
            return Err(ConvertError::malformed("furniture allows no placement"));
        }

        let behavior = target.section_mut("behavior");
        behavior.insert("type", "furniture_item");
        let out = behavior.section_mut("furniture.placement");
        for name in placements {
            out.insert(name, placement.clone());
        }
        Ok(())
    }
}

/// `seat: {height: h}` or `seat: h` → seat offset `[0, h, 0]`.
fn seat(furniture: &Section) -> Option<[f64; 3]> {
    match furniture.shape("seat") {
        Shape::Mapping(m) => Some([0.0, m.f64_or("height", 0.0), 0.0]),
        Shape::Scalar(node) => match node {
            Node::Bool(true) => Some([0.0, 0.0, 0.0]),
            other => other.as_f64().map(|h| [0.0, h, 0.0]),
        },
        _ => None,
    }
}

fn allowed_placements(furniture: &Section) -> Vec<&'static str> {
    let Some(limits) = furniture.section("limited_placing") else {
        return vec!["ground"];
    };
    [("floor", "ground", true), ("wall", "wall", false), ("roof", "ceiling", false)]
        .into_iter()
        .filter(|(key, _, default)| limits.bool_or(key, *default))
        .map(|(_, name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    const CHAIR: &str = r#"
Mechanics:
  furniture:
    seat:
      height: 0.6
    hitbox:
      barriers: ["0,0,0", "0..1,0,0"]
      shulkers: ["0,1,0 1.5 0.5 down"]
      interactions: ["0,0,0 2,1"]
"#;

    #[test]
    fn test_chair() {
        let ctx = context();
        let (t, ok) = run(&FurnitureStep, &ctx, CHAIR);
        assert!(ok);
        assert_eq!(t.str_or("behavior.type", ""), "furniture_item");
        let ground = t.section("behavior.furniture.placement.ground").unwrap();
        let elements = ground.get("elements").and_then(Node::as_list).unwrap();
        assert_eq!(elements[0].as_section().unwrap().str_or("item", ""), "test:entry");

        let hitboxes = ground.get("hitboxes").and_then(Node::as_list).unwrap();
        let kinds: Vec<&str> = hitboxes
            .iter()
            .map(|h| h.as_section().unwrap().str_or("type", ""))
            .collect();
        assert_eq!(kinds, vec!["barrier", "barrier", "shulker", "interaction"]);
        let shulker = hitboxes[2].as_section().unwrap();
        assert_eq!(shulker.string_list("seats"), vec!["0,0.6,0"]);
        assert!(t.section("behavior.furniture.placement.wall").is_none());
    }

    #[test]
    fn test_limited_placing() {
        let ctx = context();
        let (t, ok) = run(
            &FurnitureStep,
            &ctx,
            "Mechanics:\n  furniture:\n    rotatable: false\n    limited_placing:\n      floor: false\n      wall: true\n      roof: true\n",
        );
        assert!(ok);
        let placement = t.section("behavior.furniture.placement").unwrap();
        assert_eq!(placement.keys().collect::<Vec<_>>(), vec!["wall", "ceiling"]);
        assert_eq!(placement.str_or("wall.rules.rotation", ""), "NONE");
        assert!(placement.lookup("wall.hitboxes").is_none());
    }

    #[test]
    fn test_no_furniture() {
        let ctx = context();
        let (t, ok) = run(&FurnitureStep, &ctx, "Mechanics: {}\n");
        assert!(ok);
        assert!(t.is_empty());
    }
}
