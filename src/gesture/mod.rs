pub mod dictionary;
pub mod instruction;
pub mod script;
pub mod wire;

pub use dictionary::*;
pub use instruction::*;
pub use script::*;
