//! Query debouncing and outbound lookups.
//!
//! These are the two asynchronous pieces the engine drives: a restartable
//! quiet-period timer in front of the provider, and a gateway that runs the
//! lookup and tags its result with the token it was issued under.

mod debounce;
mod gateway;
mod timer;

pub use debounce::{Debounce, QueryDebouncer};
pub use gateway::{SearchGateway, SearchOutcome, SearchToken};
pub use timer::{RestartableTimer, TimerTicket};
