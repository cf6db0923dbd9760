//! One converter per entity kind. Each is a synchronous unit of work that
//! reads below `source_dir` and writes below `output_dir`.

mod assets;
mod images;
mod items;
mod languages;
mod sounds;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;

use crate::context::ConversionContext;
use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Items,
    Images,
    Sounds,
    Languages,
    Assets,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::Items,
        Kind::Images,
        Kind::Sounds,
        Kind::Languages,
        Kind::Assets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Items => "items",
            Kind::Images => "images",
            Kind::Sounds => "sounds",
            Kind::Languages => "languages",
            Kind::Assets => "assets",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Kind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| format!("unknown kind '{s}', expected one of: items, images, sounds, languages, assets"))
    }
}

/// Outcome of one kind's run.
#[derive(Debug, Clone, Serialize)]
pub struct KindReport {
    pub kind: Kind,
    /// Target documents (or copied asset files) written.
    pub files: usize,
    pub entries: usize,
    /// Files, entries or pipeline steps that failed and were skipped.
    pub failed: usize,
    /// The kind's source input was missing.
    pub skipped: bool,
    pub elapsed_ms: u64,
}

impl KindReport {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            files: 0,
            entries: 0,
            failed: 0,
            skipped: false,
            elapsed_ms: 0,
        }
    }

    pub fn skipped(kind: Kind) -> Self {
        Self {
            skipped: true,
            ..Self::new(kind)
        }
    }
}

/// Run one kind to completion on the calling thread.
pub fn run(kind: Kind, ctx: &ConversionContext) -> Result<KindReport, EngineError> {
    let started = Instant::now();
    let result = match kind {
        Kind::Items => items::convert(ctx),
        Kind::Images => images::convert(ctx),
        Kind::Sounds => sounds::convert(ctx),
        Kind::Languages => languages::convert(ctx),
        Kind::Assets => assets::convert(ctx),
    };
    let mut report = result.map_err(|e| e.with_context(kind))?;
    report.elapsed_ms = started.elapsed().as_millis() as u64;
    if report.skipped {
        tracing::info!(kind = %kind, "source input missing, kind skipped");
    } else {
        tracing::info!(
            kind = %kind,
            files = report.files,
            entries = report.entries,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "kind converted"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("Items".parse::<Kind>().unwrap(), Kind::Items);
        assert_eq!(" assets ".parse::<Kind>().unwrap(), Kind::Assets);
        assert!("glyphs".parse::<Kind>().is_err());
    }

    #[test]
    fn test_report_serializes_lowercase_kind() {
        let report = KindReport::skipped(Kind::Sounds);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "sounds");
        assert_eq!(json["skipped"], true);
    }
}
