use transmute_api::{ConvertError, Section, Shape};

use crate::config::DurabilityStrategy;
use crate::context::EntryContext;

use super::ConvertStep;

/// `Durability` / `Components.durability` and `unbreakable`.
///
/// The configured strategy decides where max durability lands:
/// `data.max-damage` (vanilla) or `settings.durability.max` (custom).
pub struct DurabilityStep;

impl ConvertStep for DurabilityStep {
    fn name(&self) -> &'static str {
        "durability"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> Result<(), ConvertError> {
        target.set_unless("data.unbreakable", source.bool_or("unbreakable", false), false);

        let durability = match source.shape("Components.durability") {
            Shape::Mapping(m) => m.i64_or("value", 0),
            Shape::Scalar(n) => n.as_i64().unwrap_or(0),
            _ => source.i64_or("Durability", 0),
        };
        if durability < 0 {
            return Err(ConvertError::malformed(format!("negative durability {durability}")));
        }
        if durability == 0 {
            return Ok(());
        }
        match cx.settings().durability {
            DurabilityStrategy::Vanilla => target.set("data.max-damage", durability),
            DurabilityStrategy::Custom => target.set("settings.durability.max", durability),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::context::ConversionContext;
    use crate::pipeline::testing::{context, run};

    #[test]
    fn test_vanilla_strategy() {
        let ctx = context();
        let (t, _) = run(&DurabilityStep, &ctx, "Durability: 250\n");
        assert_eq!(t.i64_or("data.max-damage", 0), 250);
        assert!(t.lookup("settings").is_none());
    }

    #[test]
    fn test_custom_strategy_prefers_component() {
        let settings = Settings {
            durability: DurabilityStrategy::Custom,
            ..Settings::default()
        };
        let ctx = ConversionContext::new(settings).unwrap();
        let (t, _) = run(
            &DurabilityStep,
            &ctx,
            "Durability: 10\nComponents:\n  durability:\n    value: 900\n",
        );
        assert_eq!(t.i64_or("settings.durability.max", 0), 900);
        assert!(t.lookup("data").is_none());
    }

    #[test]
    fn test_unbreakable_and_defaults() {
        let ctx = context();
        let (t, _) = run(&DurabilityStep, &ctx, "unbreakable: true\n");
        assert!(t.bool_or("data.unbreakable", false));

        let (t, ok) = run(&DurabilityStep, &ctx, "unbreakable: false\nDurability: 0\n");
        assert!(ok);
        assert!(t.is_empty());

        let (_, ok) = run(&DurabilityStep, &ctx, "Durability: -4\n");
        assert!(!ok);
    }
}
