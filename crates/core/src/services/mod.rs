pub mod account_service;
pub mod auth_service;
pub mod calculator;
pub mod calendar_service;
pub mod chat_service;
pub mod export_service;
pub mod notification_service;
pub mod pdf_writer;
pub mod report_service;
pub mod status_service;
pub mod summary_service;
pub mod support_service;
pub mod transaction_service;
