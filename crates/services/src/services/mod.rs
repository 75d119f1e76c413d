pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notification;

#[cfg(test)]
pub(crate) mod test_support;
