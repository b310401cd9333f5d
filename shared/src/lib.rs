pub mod clock;
pub mod errors;
pub mod http;
pub mod models;
pub mod naming;
pub mod services;
pub mod storage;
pub mod utils;

pub use clock::*;
pub use errors::*;
pub use http::*;
pub use models::*;
pub use naming::*;
pub use services::*;
pub use storage::*;
pub use utils::*;
