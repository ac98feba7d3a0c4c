pub mod pattern;
pub mod required;
pub mod sacrament;

pub use pattern::PatternValidator;
pub use required::{MinLengthValidator, RequiredValidator};
pub use sacrament::SacramentValidator;
