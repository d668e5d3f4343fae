pub mod error;
pub mod report_client;

pub use error::{ClientError, ClientResult};
pub use report_client::{PdfDownload, ReportClient};
