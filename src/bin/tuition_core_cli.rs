fn main() {
    tuition_core::init();
    std::process::exit(tuition_core::cli::run_cli());
}
