fn main() {
    // ESP-IDF link arguments are only relevant for the on-target binaries.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
