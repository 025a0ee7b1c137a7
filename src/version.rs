// Build-time identity from Cargo.toml

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// "hostpulse/0.3.0", used in the startup log line.
pub fn user_agent() -> String {
    format!("{}/{}", NAME, VERSION)
}
