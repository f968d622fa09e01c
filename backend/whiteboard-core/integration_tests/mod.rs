mod channel;
mod crossbar;
mod effects;
mod error;
mod helpers;
mod protocol;
