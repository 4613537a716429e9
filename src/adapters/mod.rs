pub mod logging;
pub mod memory;
pub mod mock;
