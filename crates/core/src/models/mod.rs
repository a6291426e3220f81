pub mod account;
pub mod bank;
pub mod calendar;
pub mod chat;
pub mod report;
pub mod session;
pub mod settings;
pub mod status;
pub mod summary;
pub mod support;
pub mod toast;
pub mod transaction;
