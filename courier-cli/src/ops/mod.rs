mod output;
mod requests;
mod token;
pub mod ui;

pub use output::OutputFormat;
pub use requests::{load_body, parse_header, parse_query, send_request, RequestSpec, Verb};
pub use token::{clear_token, set_token, show_token};
