pub mod resolver;

pub use resolver::{CheckInPolicy, CheckInResolver, ScanResult};
