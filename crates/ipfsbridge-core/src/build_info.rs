//! Build metadata baked in by `build.rs`.

/// `git describe` output for the tree this was built from, or `unknown`.
pub const GIT_HASH: &str = env!("IPFSBRIDGE_GIT_HASH");

/// Cargo profile name.
pub const BUILD_PROFILE: &str = env!("IPFSBRIDGE_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `"0.1.0 (a1b2c3d4e5, release)"`
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE})")
}

/// `User-Agent` sent with every daemon request.
pub fn user_agent() -> String {
    format!("ipfsbridge/{VERSION}")
}
