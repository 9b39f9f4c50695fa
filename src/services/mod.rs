pub mod attendance_service;
pub mod export_service;
pub mod identity_service;
pub mod maps_service;
pub mod sheet_requests;
pub mod sheets_client;
