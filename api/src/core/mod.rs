pub mod app_state;
pub mod http;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
