use test_utils::png_fixture_base64;
use test_utils::png_fixture_data_url;

use super::AttachmentStaging;
use crate::domain::models::ImageAttachment;

#[test]
fn it_starts_empty() {
    let staging = AttachmentStaging::default();
    assert!(staging.peek().is_none());
}

#[test]
fn it_stages_images() {
    let mut staging = AttachmentStaging::default();
    assert!(staging.set(&png_fixture_data_url(), "image/png"));

    let staged = staging.peek().unwrap();
    assert_eq!(staged.data, png_fixture_base64());
    assert_eq!(staged.mime_type, "image/png");
}

#[test]
fn it_keeps_only_the_latest_image() {
    let mut staging = AttachmentStaging::default();
    staging.set("Zmlyc3Q=", "image/png");
    staging.set("c2Vjb25k", "image/jpeg");

    assert_eq!(
        staging.peek(),
        Some(&ImageAttachment::new("c2Vjb25k", "image/jpeg"))
    );
}

#[test]
fn it_ignores_non_images() {
    let mut staging = AttachmentStaging::default();
    staging.set("Zmlyc3Q=", "image/png");

    assert!(!staging.set("aGVsbG8=", "text/plain"));
    assert_eq!(
        staging.peek(),
        Some(&ImageAttachment::new("Zmlyc3Q=", "image/png"))
    );
}

#[test]
fn it_ignores_non_images_when_empty() {
    let mut staging = AttachmentStaging::default();
    assert!(!staging.set("JVBERi0=", "application/pdf"));
    assert!(staging.peek().is_none());
}

#[test]
fn it_clears() {
    let mut staging = AttachmentStaging::default();
    staging.set("Zmlyc3Q=", "image/png");
    staging.clear();
    assert!(staging.peek().is_none());
}

#[test]
fn it_takes_the_staged_image() {
    let mut staging = AttachmentStaging::default();
    staging.set("Zmlyc3Q=", "image/png");

    assert!(staging.take().is_some());
    assert!(staging.peek().is_none());
    assert!(staging.take().is_none());
}
