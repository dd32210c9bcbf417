//! Chat core: everything the front-end does that is not rendering or I/O.
//!
//! Platform adapters implement the traits in [`ports`]; the session store,
//! persistence adapter and scroll controller only see those traits.

pub mod ports;
pub mod event_bus;
pub mod persistence;
pub mod store;
pub mod scroll;
pub mod seed;

#[cfg(test)]
mod tests;
