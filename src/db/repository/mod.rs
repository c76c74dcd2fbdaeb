pub mod appointment;
pub mod asset;
pub mod document_request;
pub mod notification;
pub mod payment;
pub mod user;

pub use appointment::*;
pub use asset::*;
pub use document_request::*;
pub use notification::*;
pub use payment::*;
pub use user::*;
