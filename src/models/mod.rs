pub mod market;
pub mod response;
pub mod stock;
pub mod validator;

pub use market::*;
pub use response::*;
pub use stock::*;
pub use validator::*;
