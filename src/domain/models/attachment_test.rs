use test_utils::png_fixture;
use test_utils::png_fixture_base64;
use test_utils::png_fixture_data_url;

use super::ImageAttachment;

#[test]
fn it_strips_data_url_prefix() {
    let attachment = ImageAttachment::new(&png_fixture_data_url(), "image/png");
    assert_eq!(attachment.data, png_fixture_base64());
    assert_eq!(attachment.mime_type, "image/png");
}

#[test]
fn it_keeps_raw_base64() {
    let attachment = ImageAttachment::new("aGVsbG8=", "image/jpeg");
    assert_eq!(attachment.data, "aGVsbG8=");
}

#[test]
fn it_normalizes_mime_type() {
    let attachment = ImageAttachment::new("aGVsbG8=", " Image/PNG ");
    assert_eq!(attachment.mime_type, "image/png");
}

#[test]
fn it_encodes_bytes() {
    let attachment = ImageAttachment::from_bytes(&png_fixture(), "image/png");
    assert_eq!(attachment.data, png_fixture_base64());
    assert_eq!(attachment.byte_len(), png_fixture().len());
}

#[test]
fn it_detects_image_mime_types() {
    assert!(ImageAttachment::is_image_mime_type("image/png"));
    assert!(ImageAttachment::is_image_mime_type("image/webp"));
    assert!(!ImageAttachment::is_image_mime_type("image/"));
    assert!(!ImageAttachment::is_image_mime_type("text/plain"));
    assert!(!ImageAttachment::is_image_mime_type("application/pdf"));
    assert!(!ImageAttachment::is_image_mime_type(""));
}

#[test]
fn it_formats_sizes() {
    assert_eq!(ImageAttachment::new("aGVsbG8=", "image/png").display_size(), "5 B");
    let kb = ImageAttachment::from_bytes(&vec![0; 2048], "image/png");
    assert_eq!(kb.display_size(), "2.0 KB");
    let mb = ImageAttachment::from_bytes(&vec![0; 3 * 1024 * 1024], "image/png");
    assert_eq!(mb.display_size(), "3.0 MB");
}
