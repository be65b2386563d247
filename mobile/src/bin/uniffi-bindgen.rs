// Generates Kotlin/Swift bindings:
//   cargo run -p system-setting-mobile --bin uniffi-bindgen -- generate \
//     --library target/release/libsystem_setting_mobile.so --language kotlin --out-dir out
fn main() {
    uniffi::uniffi_bindgen_main()
}
