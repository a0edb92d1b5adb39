//! Rule helpers shared by the extraction strategies.

pub mod dates;
pub mod patterns;
pub mod similarity;
pub mod text;

pub use dates::{
    is_bare_numeric_date, is_true_incident_date, standardize_multiple_dates, to_standard_date,
};
pub use text::normalize;
