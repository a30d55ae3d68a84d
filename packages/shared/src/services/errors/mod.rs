pub mod notification_service_errors;
