pub mod attendance_dto;
pub mod auth_dto;
pub mod export_dto;
pub mod maps_dto;
