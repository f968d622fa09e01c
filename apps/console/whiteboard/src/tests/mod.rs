mod console_view;
mod credentials;
mod error;
mod logger;
mod paths;
mod resume;
