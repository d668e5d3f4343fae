pub mod report_dto;
pub mod test_dto;
pub mod view_dto;
