use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies the workspace `config.toml` next to the built binary (target/<profile>).
fn main() {
    println!("cargo:rerun-if-changed=../../config.toml");

    let (Ok(out_dir), Ok(profile)) = (env::var("OUT_DIR"), env::var("PROFILE")) else {
        println!("cargo:warning=OUT_DIR or PROFILE not set, config.toml not copied");
        return;
    };

    // OUT_DIR: target/<profile>/build/<crate>-<hash>/out
    let Some(target_dir) = Path::new(&out_dir)
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
    else {
        println!("cargo:warning=target profile directory not found, config.toml not copied");
        return;
    };

    let source_config: PathBuf = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config.toml");

    if !source_config.exists() {
        println!(
            "cargo:warning=config.toml not found at {:?}, embedded defaults will be used",
            source_config
        );
        return;
    }

    let dest_config = target_dir.join("config.toml");
    if let Err(e) = fs::copy(&source_config, &dest_config) {
        println!("cargo:warning=failed to copy config.toml: {}", e);
    }
}
