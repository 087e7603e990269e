pub mod gateway_service;
pub mod report_service;
