pub mod metric;
pub mod backend;
pub mod snapshot;


pub use metric::Metric;
pub use backend::{Node, STATUS_UNAVAILABLE};
pub use snapshot::{MetricSnapshot, NodeSnapshot};
