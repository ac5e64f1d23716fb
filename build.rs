fn main() {
    // Only emit ESP-IDF linker/env output for target (flash) builds;
    // host test builds have no IDF environment to probe.
    if std::env::var("CARGO_FEATURE_ESPIDF").is_ok() {
        embuild::espidf::sysenv::output();
    }
}
