//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet so it can be served with a long cache lifetime.
//! The hashed copy lands in `static/css/derived/` and the short hash is exposed
//! to the crate as `STYLESHEET_HASH`.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

const STYLESHEET: &str = "static/css/main.css";
const HASH_LEN: usize = 8;

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join(STYLESHEET);
    println!("cargo:rerun-if-changed={}", css_path.display());

    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=stylesheet missing at {}", css_path.display());
        println!("cargo:rustc-env=STYLESHEET_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let short_hash: String = digest.chars().take(HASH_LEN).collect();
    println!("cargo:rustc-env=STYLESHEET_HASH={short_hash}");

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    fs::create_dir_all(&derived_dir).expect("failed to create derived stylesheet directory");
    fs::copy(&css_path, derived_dir.join(format!("main.{short_hash}.css")))
        .expect("failed to copy fingerprinted stylesheet");
}
