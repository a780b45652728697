pub mod routing;
pub mod types;
pub mod validation;
