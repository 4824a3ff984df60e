fn main() {
    if let Err(err) = guest_grouper::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
