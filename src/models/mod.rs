pub mod record;

pub use record::{DestinationSignature, RecordSequence, TrafficRecord};
