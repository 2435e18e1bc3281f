pub mod constants;
pub mod settings;

pub use settings::{
    ApplicationSettings, BackChannelSettings, ClientSettings, JwksSettings, PostgresSettings,
    RedisSettings, ReplayDetection, SessionStoreKind, SettingsError, ValidationSettings,
};
