pub mod logging;
pub mod urls;
