/// The zog version.
///
/// In development builds, this defaults to the workspace Cargo package version.
/// `make build` and `make package` stamp the latest Git tag into `VERSION` and inject it via the
/// `ZOG_VERSION` environment variable, so a release only needs a tag. An empty stamp counts as
/// unset.
pub const ZOG_VERSION: &str = match option_env!("ZOG_VERSION") {
    Some(version) if !version.is_empty() => version,
    _ => env!("CARGO_PKG_VERSION"),
};

pub fn user_agent() -> String {
    format!("zog/{ZOG_VERSION}")
}
