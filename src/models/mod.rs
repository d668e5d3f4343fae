pub mod question;
pub mod report;
pub mod report_metadata;
pub mod test_answer;
pub mod test_result;
pub mod user;
