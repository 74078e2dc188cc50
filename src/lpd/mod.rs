pub mod codec;
pub mod control;
pub mod session;
#[cfg(test)]
pub mod testing;
pub mod transmit;
