#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A 1x1 transparent PNG.
pub fn png_fixture() -> Vec<u8> {
    return vec![
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
        0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];
}

pub fn png_fixture_base64() -> String {
    return STANDARD.encode(png_fixture());
}

pub fn png_fixture_data_url() -> String {
    return format!("data:image/png;base64,{}", png_fixture_base64());
}
