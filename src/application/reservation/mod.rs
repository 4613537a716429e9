mod expiry_scheduler;
mod queue;
mod request;
mod reservation_desk;
mod worker_pool;

pub use expiry_scheduler::ExpiryScheduler;
pub use queue::ReservationQueue;
pub use request::{ReservationOutcome, ReservationRequest};
pub use reservation_desk::ReservationDesk;
pub use worker_pool::{WorkerPool, WorkerStats};
