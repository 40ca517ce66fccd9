pub mod balancer;
pub mod events;
pub mod prober;
pub mod traits;
pub mod watch;


pub use balancer::Balancer;
pub use events::{NodeUpdate, UpdateOp};
pub use prober::{apply_outcome, HttpProber, ProbeOutcome};
pub use traits::NodeProber;
pub use watch::WatchHandle;
