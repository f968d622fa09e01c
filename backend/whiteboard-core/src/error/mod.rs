pub mod channel;
pub mod config;
pub mod crossbar;
pub mod effects;
pub mod geometry;
pub mod protocol;
pub mod session;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Geometry(#[from] geometry::GeometryError),

    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Protocol(#[from] protocol::ProtocolError),

    #[error(transparent)]
    Crossbar(#[from] crossbar::CrossbarError),

    #[error(transparent)]
    Effect(#[from] effects::EffectError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Session(#[from] session::SessionStoreError),
}
