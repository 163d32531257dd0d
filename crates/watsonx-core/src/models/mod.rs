//! Remote response and error models

mod api_error;
mod response;

pub use api_error::{decode_api_error, ErrorDetail, WatsonxError};
pub use response::{ApiResponse, SUCCESS_STATUS};
