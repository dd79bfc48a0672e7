#![no_main]
use libfuzzer_sys::fuzz_target;
use pretty_assertions::assert_eq;
use uttt::game::core::Square;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(square) = Square::try_from(s) {
            assert_eq!(square.to_string(), s.trim());
        }
    }
});
