mod channel;
mod config;
mod geometry;
mod session;
mod wire;
