fn main() {
    // Host builds (tests, simulation) have no ESP-IDF toolchain to describe.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
