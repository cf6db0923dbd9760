use transmute_api::{Node, Section};

use crate::context::ConversionContext;
use crate::error::EngineError;
use crate::text::legacy_to_minimessage;
use crate::walk;

use super::{Kind, KindReport};

const GLOBAL: &str = "global";
const FALLBACK_LOCALE: &str = "en_us";

/// `paths.languages` (`{locale: {key: text}}`) → `<output>/translations.yml`.
///
/// `global` keys fill every other locale where that locale has no own value.
/// With no other locale, `global` is written as `en_us`.
pub(super) fn convert(ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let settings = &ctx.settings;
    let path = settings.source_dir.join(&settings.paths.languages);
    if !path.is_file() {
        return Ok(KindReport::skipped(Kind::Languages));
    }
    let source = walk::read_document(&path, &ctx.codecs)?;
    let mut report = KindReport::new(Kind::Languages);

    let target = settings
        .output_dir
        .join("translations")
        .with_extension(ctx.codecs.output_extension());
    walk::write_scoped(&target, ctx.codecs.output(), |document| {
        let translations = merge(&source, &mut report);
        if !translations.is_empty() {
            document.insert("translations", translations);
        }
    })?;
    report.files = 1;
    Ok(report)
}

fn merge(source: &Section, report: &mut KindReport) -> Section {
    let global = source
        .get(GLOBAL)
        .and_then(Node::as_section)
        .map(|g| texts(g, report));
    let mut out = Section::new();

    for (locale, node) in source.iter().filter(|(l, _)| *l != GLOBAL) {
        let Some(own) = node.as_section() else {
            tracing::warn!(locale, "locale is not a map, skipping");
            report.failed += 1;
            continue;
        };
        let mut merged = texts(own, report);
        if let Some(global) = &global {
            for (key, text) in global.iter() {
                if !merged.contains_key(key) {
                    merged.insert(key, text.clone());
                }
            }
        }
        report.entries += merged.len();
        out.insert(locale.to_ascii_lowercase(), merged);
    }

    if out.is_empty() {
        if let Some(global) = global {
            report.entries += global.len();
            out.insert(FALLBACK_LOCALE, global);
        }
    }
    out
}

/// Flat `key → text` with legacy formatting converted. Non-text values are
/// skipped.
fn texts(locale: &Section, report: &mut KindReport) -> Section {
    let mut out = Section::new();
    for (key, value) in locale.iter() {
        match value.scalar_string() {
            Some(text) => out.insert(key, legacy_to_minimessage(&text)),
            None => {
                tracing::warn!(key, "translation is not text, skipping");
                report.failed += 1;
            }
        }
    }
    out
}
