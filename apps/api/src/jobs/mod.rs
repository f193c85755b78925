// Job lifecycle: status machine, version history, dashboard reads.
// All persistence goes through the JobStore trait.

pub mod handlers;
pub mod stats;
pub mod status;
pub mod store;
pub mod transition;
pub mod versions;
