use super::BackendPrompt;
use super::Part;
use super::Turn;
use crate::domain::models::ChatMessage;
use crate::domain::models::ImageAttachment;
use crate::domain::models::MessageId;
use crate::domain::models::Role;

fn image() -> ImageAttachment {
    return ImageAttachment::new("aGVsbG8=", "image/jpeg");
}

#[test]
fn it_projects_image_before_text() {
    let msg = ChatMessage::user(MessageId::new(1), "What is this?", Some(image()));
    let turn = Turn::from_message(&msg).unwrap();

    assert_eq!(turn.role, Role::User);
    assert_eq!(
        turn.parts,
        vec![
            Part::Image(image()),
            Part::Text("What is this?".to_string())
        ]
    );
}

#[test]
fn it_projects_image_only_messages() {
    let msg = ChatMessage::user(MessageId::new(1), "", Some(image()));
    let turn = Turn::from_message(&msg).unwrap();
    assert_eq!(turn.parts, vec![Part::Image(image())]);
}

#[test]
fn it_never_builds_empty_turns() {
    let msg = ChatMessage::placeholder(MessageId::new(2)).finish();
    assert!(Turn::from_message(&msg).is_none());
}

#[test]
fn it_builds_prompt_turns_in_order() {
    let history = vec![
        ChatMessage::user(MessageId::new(1), "Hi", None),
        ChatMessage::model(MessageId::new(2), "Hello"),
        ChatMessage::user(MessageId::new(3), "", Some(image())),
        ChatMessage::placeholder(MessageId::new(4)).finish(),
    ];
    let prompt = BackendPrompt::new(history, "And now?".to_string(), Some(image()));
    let turns = prompt.turns();

    assert_eq!(turns.len(), 4);
    assert_eq!(
        turns.iter().map(|t| return t.role).collect::<Vec<Role>>(),
        vec![Role::User, Role::Model, Role::User, Role::User]
    );
    assert_eq!(
        turns[3].parts,
        vec![Part::Image(image()), Part::Text("And now?".to_string())]
    );
}

#[test]
fn it_always_sends_the_text_part_for_new_input() {
    let prompt = BackendPrompt::new(vec![], "".to_string(), Some(image()));
    let turns = prompt.turns();
    assert_eq!(
        turns[0].parts,
        vec![Part::Image(image()), Part::Text("".to_string())]
    );
}
