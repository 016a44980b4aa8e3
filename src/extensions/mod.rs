pub mod multicast;
pub mod ref_count;

pub use multicast::{Multicast, PublishExt};
pub use ref_count::{RefCount, RefCountState};
