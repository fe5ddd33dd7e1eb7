mod error;
pub use error::*;

pub mod few_shot;
pub use few_shot::*;

pub mod template;
pub use template::*;
