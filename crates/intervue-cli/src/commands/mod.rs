pub mod create;
pub mod dashboard;
pub mod init;
pub mod score;
pub mod take;
pub mod validate;
