pub mod key;
pub mod timing;
