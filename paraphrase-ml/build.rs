fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Only the TorchScript backend links against libtorch
    if std::env::var_os("CARGO_FEATURE_TCH_BACKEND").is_some() {
        configure_libtorch();
    }
}

fn configure_libtorch() {
    use std::env;
    use std::path::PathBuf;
    println!("cargo:rerun-if-env-changed=LIBTORCH");
    println!("cargo:rerun-if-env-changed=LIBTORCH_INCLUDE");
    println!("cargo:rerun-if-env-changed=LIBTORCH_LIB");

    let libtorch_path = env::var("LIBTORCH")
        .or_else(|_| env::var("LIBTORCH_PATH"))
        .ok()
        .map(PathBuf::from);

    match libtorch_path {
        Some(path) if path.exists() => {
            println!("cargo:warning=Found LIBTORCH at: {}", path.display());
        }
        Some(path) => {
            println!("cargo:warning=LIBTORCH path does not exist: {}", path.display());
            println!("cargo:warning=Install libtorch and point LIBTORCH at it");
        }
        None => {
            println!("cargo:warning=LIBTORCH environment variable not set (tch-backend enabled)");
            println!("cargo:warning=  1. Download libtorch from https://pytorch.org/");
            println!("cargo:warning=  2. Extract it (e.g., ~/libtorch)");
            println!("cargo:warning=  3. export LIBTORCH=~/libtorch");
            println!("cargo:warning=  4. Rebuild with --features tch-backend");
        }
    }
}
