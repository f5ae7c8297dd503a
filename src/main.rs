fn main() {
    if let Err(err) = radar_rs::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
