pub mod auth_service;
pub mod place_service;
pub mod media_host;
pub mod mailer;
