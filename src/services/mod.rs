pub mod bookings;
pub mod checkout;
pub mod consents;
pub mod finalize;
pub mod notify;
pub mod sessions;
pub mod tokens;

#[cfg(test)]
pub(crate) mod testing;
