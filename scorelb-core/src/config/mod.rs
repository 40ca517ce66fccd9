pub mod loader;
pub mod model;


pub use loader::{load_config_from_path, parse_config};
pub use model::{BalancerConfig, NodeConfig, Options};
