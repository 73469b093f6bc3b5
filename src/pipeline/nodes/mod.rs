pub mod basic;
pub mod style;
pub mod transform;

pub use basic::{ConcatNode, FileCollectorNode, FileWriterNode};
pub use style::{ContentScanNode, PurgeNode, StyleCompilerNode};
pub use transform::TransformNode;
