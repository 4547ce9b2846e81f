use anyhow::anyhow;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use test_utils::png_fixture;

use super::help_text;
use super::AppState;
use super::GENERATING_STATUS;
use crate::domain::models::Backend;
use crate::domain::models::BackendPrompt;
use crate::domain::models::FragmentStream;
use crate::domain::models::Role;
use crate::domain::services::BubbleTitles;
use crate::domain::services::TurnUpdate;
use crate::domain::services::FAILED_RESPONSE_TEXT;

enum Reply {
    Text(&'static str),
    Fail,
    Hang,
}

struct StubBackend {
    reply: Reply,
}

#[async_trait]
impl Backend for StubBackend {
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    fn stream(&self, _prompt: BackendPrompt) -> FragmentStream {
        match self.reply {
            Reply::Text(text) => return Box::pin(stream::iter(vec![Ok(text.to_string())])),
            Reply::Fail => return Box::pin(stream::iter(vec![Err(anyhow!("boom"))])),
            Reply::Hang => return Box::pin(stream::pending()),
        }
    }
}

fn new_app_state<'a>(reply: Reply) -> AppState<'a> {
    let mut app_state = AppState::new(
        Box::new(StubBackend { reply }),
        BubbleTitles {
            user: "tester".to_string(),
            model: "Model".to_string(),
        },
    );
    app_state.last_known_width = 60;
    app_state.last_known_height = 20;
    return app_state;
}

async fn type_and_submit(app_state: &mut AppState<'_>, text: &str) -> bool {
    app_state.textarea.insert_str(text);
    return app_state.submit().await.unwrap();
}

async fn drain(app_state: &mut AppState<'_>) {
    while let Some(update) = app_state.session.next_update().await {
        let done = update.is_terminal();
        app_state.handle_update(update);
        if done {
            break;
        }
    }
}

fn write_png(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let file_path = dir.path().join("pixel.png");
    std::fs::write(&file_path, png_fixture()).unwrap();
    return file_path;
}

#[tokio::test]
async fn it_sends_prompts_and_clears_the_input() {
    let mut app_state = new_app_state(Reply::Text("Hi there"));

    assert!(!type_and_submit(&mut app_state, "Hello").await);
    assert_eq!(app_state.input_text(), "");
    assert!(app_state.session.is_busy());
    assert_eq!(app_state.current_status().unwrap().text, GENERATING_STATUS);

    drain(&mut app_state).await;

    let messages = app_state.session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), "Hello");
    assert_eq!(messages[1].role(), Role::Model);
    assert_eq!(messages[1].text(), "Hi there");
    assert!(app_state.current_status().is_none());
    assert!(app_state.bubble_list.len() > 0);
}

#[tokio::test]
async fn it_ignores_empty_prompts() {
    let mut app_state = new_app_state(Reply::Text("unused"));

    assert!(!type_and_submit(&mut app_state, "   ").await);
    assert!(app_state.session.messages().is_empty());
    assert!(!app_state.session.is_busy());
}

#[tokio::test]
async fn it_keeps_input_while_busy() {
    let mut app_state = new_app_state(Reply::Hang);

    type_and_submit(&mut app_state, "first").await;
    type_and_submit(&mut app_state, "second").await;

    assert_eq!(app_state.input_text(), "second");
    assert_eq!(app_state.session.messages().len(), 2);
    assert!(app_state.current_status().unwrap().is_error);
}

#[tokio::test]
async fn it_reports_failed_turns() {
    let mut app_state = new_app_state(Reply::Fail);

    type_and_submit(&mut app_state, "Hello").await;
    drain(&mut app_state).await;

    let status = app_state.current_status().unwrap();
    assert!(status.is_error);
    assert_eq!(status.text, "Request failed: boom");
    assert_eq!(app_state.session.messages()[1].text(), FAILED_RESPONSE_TEXT);
}

#[tokio::test]
async fn it_quits() {
    let mut app_state = new_app_state(Reply::Text("unused"));
    assert!(type_and_submit(&mut app_state, "/quit").await);

    let mut app_state = new_app_state(Reply::Text("unused"));
    assert!(type_and_submit(&mut app_state, "/q").await);
}

#[tokio::test]
async fn it_shows_help_until_next_submit() {
    let mut app_state = new_app_state(Reply::Text("unused"));

    type_and_submit(&mut app_state, "/help").await;
    assert!(app_state.show_help);
    assert!(app_state.session.messages().is_empty());

    type_and_submit(&mut app_state, "hi").await;
    assert!(!app_state.show_help);
    assert!(help_text().contains("/attach (/a) [PATH]"));
}

#[tokio::test]
async fn it_attaches_and_detaches_images() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = write_png(&dir);
    let mut app_state = new_app_state(Reply::Text("A pixel"));

    type_and_submit(&mut app_state, &format!("/attach {}", file_path.display())).await;
    assert_eq!(app_state.session.attachment().unwrap().mime_type, "image/png");
    assert!(!app_state.current_status().unwrap().is_error);

    type_and_submit(&mut app_state, "/detach").await;
    assert!(app_state.session.attachment().is_none());
    return Ok(());
}

#[tokio::test]
async fn it_sends_image_only_messages() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = write_png(&dir);
    let mut app_state = new_app_state(Reply::Text("A pixel"));

    type_and_submit(&mut app_state, &format!("/a {}", file_path.display())).await;
    app_state.submit().await?;
    drain(&mut app_state).await;

    let messages = app_state.session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text(), "");
    assert!(messages[0].image().is_some());
    assert!(app_state.session.attachment().is_none());
    return Ok(());
}

#[tokio::test]
async fn it_does_not_send_attach_without_path() {
    let mut app_state = new_app_state(Reply::Text("unused"));

    assert!(!type_and_submit(&mut app_state, "/a").await);
    assert!(!type_and_submit(&mut app_state, "/attach").await);

    assert!(app_state.session.messages().is_empty());
    assert!(!app_state.session.is_busy());
    assert!(app_state.session.attachment().is_none());
    assert!(app_state.current_status().unwrap().is_error);
}

#[tokio::test]
async fn it_rejects_attaching_non_images() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = dir.path().join("notes.txt");
    std::fs::write(&file_path, "hello")?;
    let mut app_state = new_app_state(Reply::Text("unused"));

    type_and_submit(&mut app_state, &format!("/attach {}", file_path.display())).await;

    assert!(app_state.session.attachment().is_none());
    assert!(app_state.current_status().unwrap().is_error);
    return Ok(());
}

#[tokio::test]
async fn it_stages_pasted_image_paths() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let file_path = write_png(&dir);
    let mut app_state = new_app_state(Reply::Text("unused"));

    app_state
        .paste(&format!("'{}'", file_path.display()))
        .await;

    assert!(app_state.session.attachment().is_some());
    assert_eq!(app_state.input_text(), "");
    return Ok(());
}

#[tokio::test]
async fn it_pastes_text_into_the_prompt() {
    let mut app_state = new_app_state(Reply::Text("unused"));

    app_state.paste("line one\r\nline two").await;

    assert_eq!(app_state.input_text(), "line one\nline two");
    assert!(app_state.session.attachment().is_none());
}

#[tokio::test]
async fn it_clears_after_confirmation() {
    let mut app_state = new_app_state(Reply::Text("Hi"));
    type_and_submit(&mut app_state, "Hello").await;
    drain(&mut app_state).await;

    type_and_submit(&mut app_state, "/clear").await;
    assert!(app_state.confirming_clear);
    assert_eq!(app_state.session.messages().len(), 2);

    type_and_submit(&mut app_state, "yes").await;
    assert!(!app_state.confirming_clear);
    assert!(app_state.session.messages().is_empty());
}

#[tokio::test]
async fn it_cancels_clear_on_any_other_answer() {
    let mut app_state = new_app_state(Reply::Text("Hi"));
    type_and_submit(&mut app_state, "Hello").await;
    drain(&mut app_state).await;

    type_and_submit(&mut app_state, "/clear").await;
    type_and_submit(&mut app_state, "nope").await;

    assert!(!app_state.confirming_clear);
    assert_eq!(app_state.session.messages().len(), 2);
}

#[tokio::test]
async fn it_refuses_to_clear_while_busy() {
    let mut app_state = new_app_state(Reply::Hang);
    type_and_submit(&mut app_state, "Hello").await;

    type_and_submit(&mut app_state, "/clear").await;

    assert!(!app_state.confirming_clear);
    assert!(app_state.current_status().unwrap().is_error);
    assert_eq!(app_state.session.messages().len(), 2);
}

#[tokio::test]
async fn it_exports_the_chat() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut app_state = new_app_state(Reply::Text("Hi"));

    type_and_submit(&mut app_state, &format!("/export {}", dir.path().display())).await;
    assert_eq!(
        app_state.current_status().unwrap().text,
        "There is nothing to export yet."
    );

    type_and_submit(&mut app_state, "Hello").await;
    drain(&mut app_state).await;
    type_and_submit(&mut app_state, &format!("/e {}", dir.path().display())).await;

    let status = app_state.current_status().unwrap();
    assert!(!status.is_error);
    assert!(status.text.starts_with("Chat exported to "));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
    return Ok(());
}

#[tokio::test]
async fn it_has_nothing_to_copy_before_a_reply() {
    let mut app_state = new_app_state(Reply::Text("unused"));

    type_and_submit(&mut app_state, "/copy").await;
    assert_eq!(
        app_state.current_status().unwrap().text,
        "There is no reply to copy yet."
    );

    type_and_submit(&mut app_state, "/copy all").await;
    assert_eq!(
        app_state.current_status().unwrap().text,
        "There is nothing to copy yet."
    );
}

#[tokio::test]
async fn it_ignores_stray_updates() {
    let mut app_state = new_app_state(Reply::Text("unused"));
    app_state.handle_update(TurnUpdate::Completed);

    assert!(app_state.current_status().is_none());
    assert!(app_state.session.next_update().await.is_none());
}
