pub mod env {
    pub const APP_ENVIRONMENT_ENV_VAR: &str = "APP_ENVIRONMENT";
    pub const CONFIG_DIR_ENV_VAR: &str = "BACKCHANNEL_CONFIG_DIR";
    /// Prefix for overriding settings, e.g. `BACKCHANNEL__APPLICATION__ADDRESS`.
    pub const SETTINGS_ENV_PREFIX: &str = "BACKCHANNEL";
    pub const SETTINGS_ENV_SEPARATOR: &str = "__";
}

pub const DEFAULT_CONFIG_DIR: &str = "config";
pub const DEFAULT_ENVIRONMENT: &str = "local";
pub const DEFAULT_LOGOUT_PATH: &str = "/logout/connect/back-channel";

pub mod jwks {
    use std::time::Duration;

    pub const CACHE_TTL: Duration = Duration::from_secs(300);
    pub const TIMEOUT: Duration = Duration::from_secs(10);
}

pub mod prod {
    pub const APP_ADDRESS: &str = "0.0.0.0:3000";
}

pub mod test {
    pub const APP_ADDRESS: &str = "127.0.0.1:0";

    pub mod jwks {
        use std::time::Duration;

        pub const TIMEOUT: Duration = Duration::from_millis(200);
    }
}
