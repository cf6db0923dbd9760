use crate::error::ConvertError;
use crate::section::Section;

/// Document codec: performs `bytes ↔ Section`.
///
/// The root of every document is a map. An empty input decodes to an empty
/// section.
pub trait DocumentCodec: Send + Sync {
    /// File extensions handled by this codec, lowercase, without the dot.
    fn extensions(&self) -> &[&str];

    fn decode(&self, bytes: &[u8]) -> Result<Section, ConvertError>;

    fn encode(&self, doc: &Section) -> Result<Vec<u8>, ConvertError>;
}
