pub mod report_request;
pub mod report_response;
pub mod reports_route;
