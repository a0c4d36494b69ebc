pub mod settings;

pub use settings::{
    CURRENT_VERSION, CatalogSettings, LogFormat, LoggingSettings, Settings, SettingsError,
    TomlSettingsStore,
};
