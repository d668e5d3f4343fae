pub mod chart_service;
pub mod content_service;
pub mod interpretation;
pub mod pdf_service;
pub mod question_service;
pub mod report_service;
pub mod report_view_service;
pub mod result_service;
pub mod summary_service;
pub mod test_service;
pub mod user_service;
