//! Build script for transcode-node
//!
//! Handles:
//! 1. NAPI-RS setup (feature `node`)
//! 2. Locating and dynamically linking the native wrapper library (feature `native`)

use std::env;
use std::path::PathBuf;

/// Default name of the native wrapper library (`libmts-ffmpeg-wrapper.{so,dylib}`)
const DEFAULT_ENGINE_LIB: &str = "mts-ffmpeg-wrapper";

fn main() {
  println!("cargo:rerun-if-changed=build.rs");
  println!("cargo:rerun-if-env-changed=TRANSCODE_ENGINE_DIR");
  println!("cargo:rerun-if-env-changed=TRANSCODE_ENGINE_LIB");

  // NAPI-RS build setup
  if env::var_os("CARGO_FEATURE_NODE").is_some() {
    napi_build::setup();
  }

  if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
    return;
  }

  let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
  let lib_name = env::var("TRANSCODE_ENGINE_LIB").unwrap_or_else(|_| DEFAULT_ENGINE_LIB.into());

  match find_engine_dir(&lib_name, &target_os) {
    Some(dir) => {
      println!("cargo:rustc-link-search=native={}", dir.display());
      // Let the addon and the CLI find the library next to where it was linked
      if target_os != "windows" {
        println!("cargo:rustc-link-arg=-Wl,-rpath,{}", dir.display());
      }
    }
    None => {
      println!(
        "cargo:warning=lib{} not found. Set TRANSCODE_ENGINE_DIR to the directory containing it.",
        lib_name
      );
    }
  }

  println!("cargo:rustc-link-lib=dylib={}", lib_name);
}

/// Shared library file name for the target platform
fn shared_lib_file(lib_name: &str, target_os: &str) -> String {
  match target_os {
    "macos" | "ios" => format!("lib{}.dylib", lib_name),
    "windows" => format!("{}.dll", lib_name),
    _ => format!("lib{}.so", lib_name),
  }
}

/// Get the directory holding the native wrapper library
fn find_engine_dir(lib_name: &str, target_os: &str) -> Option<PathBuf> {
  let file = shared_lib_file(lib_name, target_os);

  // Explicit override wins
  if let Ok(dir) = env::var("TRANSCODE_ENGINE_DIR") {
    return Some(PathBuf::from(dir));
  }

  // Check for pkg-config on Unix systems
  #[cfg(unix)]
  {
    if let Ok(output) = std::process::Command::new("pkg-config")
      .args(["--variable=libdir", lib_name])
      .output()
    {
      if output.status.success() {
        let libdir = String::from_utf8_lossy(&output.stdout);
        let path = PathBuf::from(libdir.trim());
        if path.join(&file).exists() {
          return Some(path);
        }
      }
    }
  }

  // Build output of the wrapper, then common installation paths
  let mut candidates = Vec::new();
  if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
    candidates.push(PathBuf::from(&manifest_dir).join("dist"));
  }

  let common_paths: &[&str] = match target_os {
    "macos" => &["/opt/homebrew/lib", "/usr/local/lib", "/opt/local/lib"],
    "linux" => &[
      "/usr/lib",
      "/usr/local/lib",
      "/usr/lib/x86_64-linux-gnu",
      "/usr/lib/aarch64-linux-gnu",
    ],
    _ => &[],
  };
  candidates.extend(common_paths.iter().map(PathBuf::from));

  candidates.into_iter().find(|dir| dir.join(&file).exists())
}
