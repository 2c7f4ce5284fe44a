fn main() {
    if let Err(e) = gcbench::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
