fn main() -> std::process::ExitCode {
    rxscan_lib::run()
}
