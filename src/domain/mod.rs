mod account;
mod agreement;
mod money;

pub use account::*;
pub use agreement::*;
pub use money::*;
