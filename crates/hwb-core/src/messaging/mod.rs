//! Outbound messaging abstraction (Telegram today).

pub mod port;

#[cfg(test)]
pub(crate) mod fake;
