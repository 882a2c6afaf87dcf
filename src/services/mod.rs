//! 服务层模块

mod form_service;
mod session;
pub mod translator;

pub use form_service::FormService;
pub use session::SessionStore;
