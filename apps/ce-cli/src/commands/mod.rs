pub mod launch;
pub mod payload;
pub mod validate;
