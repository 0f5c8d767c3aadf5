fn main() {
    if let Err(err) = panformat::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
