mod grouped;
mod partition;

pub(crate) use self::grouped::GroupedRow;
pub(crate) use self::partition::PartitionRow;
pub use self::partition::{Partition, PartitionId};
