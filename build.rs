//! Build script - puts `memory.x` where the linker looks for it.
//!
//! Only the firmware links against it; host builds of the library just
//! get an extra search path.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));

    // Flash layout leaves the settings pages out of the image.
    fs::copy("memory.x", out_dir.join("memory.x")).expect("memory.x next to Cargo.toml");

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
