use super::Scroll;

#[test]
fn it_follows_the_bottom_by_default() {
    let mut scroll = Scroll::default();
    scroll.set_state(100, 20);
    assert_eq!(scroll.position, 80);

    scroll.set_state(110, 20);
    assert_eq!(scroll.position, 90);
}

#[test]
fn it_stops_following_when_scrolling_up() {
    let mut scroll = Scroll::default();
    scroll.set_state(100, 20);
    scroll.up();
    assert_eq!(scroll.position, 79);
    assert!(!scroll.following);

    scroll.set_state(110, 20);
    assert_eq!(scroll.position, 79);
}

#[test]
fn it_resumes_following_at_the_bottom() {
    let mut scroll = Scroll::default();
    scroll.set_state(100, 20);
    scroll.up_page();
    assert_eq!(scroll.position, 70);

    scroll.down_page();
    assert_eq!(scroll.position, 80);
    assert!(scroll.following);
}

#[test]
fn it_clamps_to_the_top() {
    let mut scroll = Scroll::default();
    scroll.set_state(10, 20);
    scroll.up();
    scroll.up_page();
    assert_eq!(scroll.position, 0);

    scroll.down();
    assert_eq!(scroll.position, 0);
}

#[test]
fn it_jumps_to_last() {
    let mut scroll = Scroll::default();
    scroll.set_state(50, 10);
    scroll.up_page();
    scroll.last();
    assert_eq!(scroll.position, 40);
    assert!(scroll.following);
}
