// Library exports for testing
// The binary (main.rs) imports these as well

pub mod console_view;
pub mod credentials;
pub mod error;
pub mod logger;
pub mod operator;
pub mod paths;
pub mod resume;

#[cfg(test)]
mod tests;
