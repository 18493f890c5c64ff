pub mod attr;
pub mod duration;
pub mod tags;
pub mod verdict;

pub use attr::{resolve, AttrValue, AttributeMap};
pub use duration::{normalize_hours, Normalized};
pub use tags::resolve_tags;
pub use verdict::{EvaluationResult, Resource, Verdict};
