//! Item field conversion.
//!
//! A [`Pipeline`] is an ordered list of independent steps. Each step reads a
//! few fields of the source entry and adds what it produces to the target
//! entry. A failing step is logged and skipped; the remaining steps still run.
//!
//! Two orderings matter: `material` runs before anything branching on the
//! material, and `model` runs before `block`, which reuses the built model.

mod attribute;
mod block;
mod color;
mod components;
mod consumable;
mod display;
mod durability;
mod enchantment;
mod equippable;
mod furniture;
mod material;
mod mechanics;
mod model;
mod tool;

pub use attribute::AttributeStep;
pub use block::BlockStep;
pub use color::ColorStep;
pub use components::ComponentsStep;
pub use consumable::ConsumableStep;
pub use display::{DisplayNameStep, LoreStep};
pub use durability::DurabilityStep;
pub use enchantment::EnchantmentStep;
pub use equippable::EquippableStep;
pub use furniture::FurnitureStep;
pub use material::MaterialStep;
pub use mechanics::MechanicsAuditStep;
pub use model::ModelStep;
pub use tool::ToolStep;

use transmute_api::{ConvertError, ErrorKind, Section};

use crate::context::EntryContext;

/// One field group of the item conversion.
pub trait ConvertStep: Send + Sync {
    /// Step name for logs.
    fn name(&self) -> &'static str;

    fn convert(
        &self,
        cx: &EntryContext<'_>,
        source: &Section,
        target: &mut Section,
    ) -> Result<(), ConvertError>;
}

#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn ConvertStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: impl ConvertStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// The item pipeline in its required order.
    pub fn items() -> Self {
        Self::new()
            .with_step(MaterialStep)
            .with_step(DisplayNameStep)
            .with_step(LoreStep)
            .with_step(ColorStep)
            .with_step(EnchantmentStep)
            .with_step(AttributeStep)
            .with_step(DurabilityStep)
            .with_step(ConsumableStep)
            .with_step(EquippableStep)
            .with_step(ToolStep)
            .with_step(ComponentsStep)
            .with_step(ModelStep)
            .with_step(FurnitureStep)
            .with_step(BlockStep)
            .with_step(MechanicsAuditStep)
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step. Returns the number of steps that failed.
    pub fn run(&self, cx: &EntryContext<'_>, source: &Section, target: &mut Section) -> usize {
        let mut failed = 0;
        for step in &self.steps {
            if let Err(e) = step.convert(cx, source, target) {
                failed += 1;
                match e.kind {
                    ErrorKind::MalformedToken | ErrorKind::Unsupported => {
                        tracing::warn!(id = %cx.id, step = step.name(), error = %e, "step skipped")
                    }
                    _ => tracing::error!(id = %cx.id, step = step.name(), error = %e, "step failed"),
                }
            }
        }
        failed
    }
}

/// Resolved material of an entry under conversion.
pub(crate) fn target_material(target: &Section) -> &str {
    target.str_or("material", "")
}

/// Lowercase id with `namespace:` added when missing.
pub(crate) fn qualified(raw: &str, namespace: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.contains(':') {
        lower
    } else {
        format!("{namespace}:{lower}")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use transmute_api::Section;
    use transmute_format_yaml::YamlCodec;
    use transmute_api::DocumentCodec;

    use crate::config::Settings;
    use crate::context::{ConversionContext, EntryContext};

    use super::ConvertStep;

    pub fn context() -> ConversionContext {
        ConversionContext::new(Settings::default()).unwrap()
    }

    pub fn yaml(text: &str) -> Section {
        YamlCodec.decode(text.as_bytes()).unwrap()
    }

    /// Run `step` over `source` with an empty target.
    pub fn run(step: &dyn ConvertStep, ctx: &ConversionContext, source: &str) -> (Section, bool) {
        let source = yaml(source);
        let mut target = Section::new();
        let cx = EntryContext::new("test:entry", ctx);
        let ok = step.convert(&cx, &source, &mut target).is_ok();
        (target, ok)
    }
}
