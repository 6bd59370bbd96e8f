//! Internal utility functions

use vst3::Steinberg::Vst::String128;
use vst3::Steinberg::TUID;

/// Convert a C-style string to Rust String
pub fn c_str_to_string(c_str: &[i8]) -> String {
    let end = c_str.iter().position(|&c| c == 0).unwrap_or(c_str.len());
    let bytes: Vec<u8> = c_str[..end].iter().map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).to_string()
}

/// Convert VST3 String128 (UTF-16) to Rust String
pub fn vst_string_to_string(vst_str: &String128) -> String {
    let utf16: Vec<u16> = vst_str
        .iter()
        .take_while(|&&ch| ch != 0)
        .map(|&ch| ch as u16)
        .collect();

    String::from_utf16_lossy(&utf16)
}

/// Hex form of a 16-byte class id, used as the description uid
pub fn tuid_to_hex(tuid: &TUID) -> String {
    tuid.iter().map(|b| format!("{:02X}", *b as u8)).collect()
}
