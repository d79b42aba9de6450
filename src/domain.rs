pub mod compose;
pub mod email_address;
pub mod entities;
pub mod sanitize;
pub mod use_cases;
