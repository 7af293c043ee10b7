//! Native symbol resolution for `extern` functions.
//!
//! Dynamic library loading itself lives outside the front end; the parser
//! only needs a collaborator that, given a library name and symbol, produces
//! an opaque handle or an error. The default [`PathResolver`] checks that the
//! shared library file exists under the search path with the OS-appropriate
//! suffix; embedders and tests install their own resolver.

use std::path::{Path, PathBuf};

/// Shared-library suffix for the current platform.
#[cfg(target_os = "macos")]
pub const DYLIB_SUFFIX: &str = "dylib";
#[cfg(target_os = "windows")]
pub const DYLIB_SUFFIX: &str = "dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DYLIB_SUFFIX: &str = "so";

/// An opaque handle to a resolved native function; the virtual machine knows
/// what to do with it, the front end only threads it through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NativeHandle {
    pub library: PathBuf,
    pub symbol: String,
}

pub trait NativeResolver {
    /// Resolve `symbol` in the shared library `lib_name` (without suffix).
    ///
    /// # Errors
    ///
    /// A human-readable message when the library or symbol cannot be found;
    /// the parser reports it at the `extern` declaration.
    fn resolve(&self, lib_name: &str, symbol: &str) -> Result<NativeHandle, String>;
}

/// Resolver that locates the library file on disk without loading it.
pub struct PathResolver {
    search_path: PathBuf,
}

impl PathResolver {
    #[must_use]
    pub fn new(search_path: impl Into<PathBuf>) -> Self {
        Self {
            search_path: search_path.into(),
        }
    }
}

impl NativeResolver for PathResolver {
    fn resolve(&self, lib_name: &str, symbol: &str) -> Result<NativeHandle, String> {
        let file_name = format!("lib{lib_name}.{DYLIB_SUFFIX}");
        let candidates = [
            self.search_path.join(&file_name),
            Path::new(".").join(&file_name),
        ];
        for candidate in &candidates {
            if candidate.exists() {
                return Ok(NativeHandle {
                    library: candidate.clone(),
                    symbol: symbol.to_string(),
                });
            }
        }
        Err(format!(
            "Could not find library `{file_name}` for symbol `{symbol}`."
        ))
    }
}
