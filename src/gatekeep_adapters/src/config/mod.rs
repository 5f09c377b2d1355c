pub mod settings;

pub use settings::{PostgresSettings, SessionSettings, Settings};
