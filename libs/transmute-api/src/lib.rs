pub mod codec;
pub mod error;
pub mod node;
pub mod section;

pub use codec::DocumentCodec;
pub use error::{ConvertError, ErrorKind};
pub use node::{Node, Shape};
pub use section::Section;
