mod activation;
mod license;
mod release;
mod update_token;

pub use activation::*;
pub use license::*;
pub use release::*;
pub use update_token::*;
