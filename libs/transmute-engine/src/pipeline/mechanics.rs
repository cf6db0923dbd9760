use transmute_api::{ConvertError, Section};

use crate::context::EntryContext;

use super::ConvertStep;

const CONVERTED: &[&str] = &["furniture", "custom_block"];

/// Reports every `Mechanics.*` key no step converts. Writes nothing.
pub struct MechanicsAuditStep;

impl ConvertStep for MechanicsAuditStep {
    fn name(&self) -> &'static str {
        "mechanics"
    }

    fn convert(&self, cx: &EntryContext<'_>, source: &Section, _target: &mut Section) -> Result<(), ConvertError> {
        let Some(mechanics) = source.section("Mechanics") else {
            return Ok(());
        };
        for key in mechanics.keys().filter(|k| !CONVERTED.contains(k)) {
            tracing::warn!(id = %cx.id, mechanic = %key, "mechanic has no target equivalent, dropped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{context, run};

    #[test]
    fn test_audit_writes_nothing() {
        let ctx = context();
        let (t, ok) = run(
            &MechanicsAuditStep,
            &ctx,
            "Mechanics:\n  furniture: {}\n  backpack: {rows: 3}\n",
        );
        assert!(ok);
        assert!(t.is_empty());
    }
}
