pub mod detection;
pub mod lenient;
pub mod value;
pub mod webhook;
