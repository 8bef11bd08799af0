//! Command: print version information.

/// Version reported by `appsync version`: the build-time `APPSYNC_VERSION`
/// when set, otherwise the crate version.
pub const VERSION: &str = match option_env!("APPSYNC_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Print the appsync version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("appsync {VERSION}");
}
