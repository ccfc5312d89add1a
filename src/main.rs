fn main() -> std::process::ExitCode {
    address_normalizer_lib::run()
}
