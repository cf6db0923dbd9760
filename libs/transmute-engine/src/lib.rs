pub mod blacklist;
pub mod config;
pub mod context;
pub mod converter;
pub mod error;
pub mod geometry;
pub mod kinds;
pub mod pipeline;
pub mod registry;
pub mod remap;
pub mod template;
pub mod text;
mod walk;

pub use config::{ConverterConfig, DurabilityStrategy, Settings};
pub use context::ConversionContext;
pub use converter::Converter;
pub use error::EngineError;
pub use kinds::{Kind, KindReport};
pub use registry::{ImageEntry, ImageRegistry};
