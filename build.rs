use std::{
    env, fs,
    path::{Path, PathBuf},
};

const SETTINGS: &str = "settings.json";

// Puts settings.json beside the compiled binary, where `Settings::load`
// falls back to when the working directory has none.
fn main() {
    println!("cargo:rerun-if-changed={SETTINGS}");

    // OUT_DIR is target/<profile>/build/<package>/out
    let profile_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .and_then(|out| out.ancestors().nth(3).map(Path::to_path_buf));

    let Some(profile_dir) = profile_dir else {
        println!("cargo:warning={SETTINGS} not copied: cannot locate the target directory");
        return;
    };

    if let Err(e) = fs::copy(SETTINGS, profile_dir.join(SETTINGS)) {
        println!("cargo:warning={SETTINGS} not copied next to the binary: {e}");
    }
}
