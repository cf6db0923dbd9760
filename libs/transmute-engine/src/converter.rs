use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::context::ConversionContext;
use crate::error::EngineError;
use crate::kinds::{self, Kind, KindReport};

pub type KindHandle = JoinHandle<Result<KindReport, EngineError>>;

/// Entry point of a conversion run.
///
/// Each kind can run synchronously on the caller's thread or as a single
/// blocking task on the tokio runtime. Kinds share only the
/// [`ConversionContext`].
#[derive(Debug, Clone)]
pub struct Converter {
    ctx: Arc<ConversionContext>,
}

impl Converter {
    pub fn new(settings: Settings) -> Result<Self, EngineError> {
        Ok(Self::with_context(Arc::new(ConversionContext::new(settings)?)))
    }

    pub fn with_context(ctx: Arc<ConversionContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<ConversionContext> {
        &self.ctx
    }

    // ═══════════════════════════════════════════════════════════════
    //  Synchronous
    // ═══════════════════════════════════════════════════════════════

    pub fn convert(&self, kind: Kind) -> Result<KindReport, EngineError> {
        kinds::run(kind, &self.ctx)
    }

    pub fn convert_items(&self) -> Result<KindReport, EngineError> {
        self.convert(Kind::Items)
    }

    pub fn convert_images(&self) -> Result<KindReport, EngineError> {
        self.convert(Kind::Images)
    }

    pub fn convert_sounds(&self) -> Result<KindReport, EngineError> {
        self.convert(Kind::Sounds)
    }

    pub fn convert_languages(&self) -> Result<KindReport, EngineError> {
        self.convert(Kind::Languages)
    }

    pub fn convert_assets(&self) -> Result<KindReport, EngineError> {
        self.convert(Kind::Assets)
    }

    // ═══════════════════════════════════════════════════════════════
    //  Background
    // ═══════════════════════════════════════════════════════════════

    /// Run `kind` on a blocking worker. Must be called inside a tokio runtime.
    pub fn convert_async(&self, kind: Kind) -> KindHandle {
        let ctx = Arc::clone(&self.ctx);
        tokio::task::spawn_blocking(move || kinds::run(kind, &ctx))
    }

    pub fn convert_items_async(&self) -> KindHandle {
        self.convert_async(Kind::Items)
    }

    pub fn convert_images_async(&self) -> KindHandle {
        self.convert_async(Kind::Images)
    }

    pub fn convert_sounds_async(&self) -> KindHandle {
        self.convert_async(Kind::Sounds)
    }

    pub fn convert_languages_async(&self) -> KindHandle {
        self.convert_async(Kind::Languages)
    }

    pub fn convert_assets_async(&self) -> KindHandle {
        self.convert_async(Kind::Assets)
    }

    /// Launch every kind at once and wait for all of them. Results are in
    /// `kinds` order; one kind failing does not affect the others.
    pub async fn convert_all(&self, kinds: &[Kind]) -> Vec<Result<KindReport, EngineError>> {
        let started = Instant::now();
        let handles: Vec<(Kind, KindHandle)> = kinds
            .iter()
            .map(|&kind| (kind, self.convert_async(kind)))
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (kind, handle) in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(EngineError::Worker {
                    kind,
                    detail: e.to_string(),
                }),
            };
            if let Err(e) = &result {
                tracing::error!(kind = %kind, error = %e, "kind failed");
            }
            results.push(result);
        }

        tracing::info!(
            kinds = kinds.len(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion finished"
        );
        results
    }

    /// Synchronous counterpart of [`Converter::convert_all`]: kinds run one
    /// after another on the calling thread.
    pub fn convert_all_sync(&self, kinds: &[Kind]) -> Vec<Result<KindReport, EngineError>> {
        let started = Instant::now();
        let results: Vec<_> = kinds
            .iter()
            .map(|&kind| {
                let result = self.convert(kind);
                if let Err(e) = &result {
                    tracing::error!(kind = %kind, error = %e, "kind failed");
                }
                result
            })
            .collect();
        tracing::info!(
            kinds = kinds.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "conversion finished"
        );
        results
    }
}
