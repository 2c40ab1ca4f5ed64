//! Platform names in the vocabulary of the Go distribution.
//!
//! Rust reports `macos`/`aarch64`/`x86_64`; Go archives are named with
//! `darwin`/`arm64`/`amd64`. Downloads and binary evaluation both speak Go's
//! dialect, so everything outside this module uses these names.

/// Operating system of the running process, as Go's `GOOS` would name it.
pub fn host_os() -> &'static str {
    go_os(std::env::consts::OS)
}

/// Architecture of the running process, as Go's `GOARCH` would name it.
pub fn host_arch() -> &'static str {
    go_arch(std::env::consts::ARCH)
}

/// Executable suffix for binaries of the given target OS.
pub fn exe_suffix(os: &str) -> &'static str {
    if os == "windows" { ".exe" } else { "" }
}

fn go_os(rust_os: &'static str) -> &'static str {
    match rust_os {
        "macos" => "darwin",
        other => other,
    }
}

fn go_arch(rust_arch: &'static str) -> &'static str {
    match rust_arch {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "arm" => "armv6l",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
