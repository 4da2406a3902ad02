fn main() {
    if let Err(err) = auto_elt::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
