//! REPL integration tests
//!
//! Commands typed at the prompt go through the same parsing and execution
//! as the command line and land in the shared state file.

use smilecare::cli::{Action, DietCommand, SymptomsCommand};
use smilecare::config::Config;
use smilecare::repl::{
    commands::{split_words, Command, CommandHandler},
    display::DisplayManager,
    session::SessionManager,
    ReplSession,
};
use smilecare::state::StateStore;
use smilecare::symptoms::CheckupKind;
use tempfile::TempDir;

fn repl(dir: &TempDir) -> ReplSession {
    ReplSession::new(Config::default(), StateStore::in_dir(dir.path())).unwrap()
}

#[test]
fn test_slash_prefix_is_optional() {
    let handler = CommandHandler::new();
    assert_eq!(handler.parse("/diet snacks"), handler.parse("diet snacks"));
    assert_eq!(handler.parse("diet snacks"), Command::Run(Action::Diet(DietCommand::Snacks)));
}

#[test]
fn test_symptom_words_are_collected() {
    let handler = CommandHandler::new();
    let command = handler.parse(r#"/symptoms check bad-breath "dry mouth" "bad taste""#);
    assert_eq!(
        command,
        Command::Run(Action::Symptoms(SymptomsCommand::Check {
            kind: CheckupKind::BadBreath,
            symptoms: vec!["dry mouth".to_string(), "bad taste".to_string()],
            image: None,
        }))
    );
}

#[test]
fn test_split_words_keeps_inner_spacing() {
    assert_eq!(split_words("  a   'b  c'  d ").unwrap(), vec!["a", "b  c", "d"]);
    assert!(split_words("").unwrap().is_empty());
}

#[test]
fn test_full_session_flow() {
    let dir = TempDir::new().unwrap();
    let mut session = repl(&dir);

    let inputs = [
        "/remind medicine Fluoride 21:00",
        "/remind appointment \"2099-07-01 10:00\"",
        "/diet log sam \"Sugary Snacks\" --date 2025-01-01",
        "/symptoms check sensitivity cold",
        "/symptoms check mouth-ulcers \"red spots on tongue\"",
        "/status",
        "/history 3",
        "/help",
    ];
    for input in inputs {
        assert!(session.handle_input(input).unwrap(), "input ended session: {}", input);
    }

    let state = session.session().state();
    assert_eq!(state.reminders.len(), 2);
    assert_eq!(state.diet.history("sam").unwrap().len(), 1);
    let results: Vec<&str> = state.symptoms.history().iter().map(|e| e.result.as_str()).collect();
    assert_eq!(
        results,
        vec!["Teeth sensitivity detected for cold.", "Mouth ulcers detected. Consider oral gel treatment."]
    );
    assert_eq!(session.command_count(), 5);

    assert!(!session.handle_input("/exit").unwrap());
    session.save().unwrap();

    let reopened = SessionManager::open(Config::default(), StateStore::in_dir(dir.path()));
    assert_eq!(reopened.state().reminders.len(), 2);
}

#[test]
fn test_errors_do_not_end_session() {
    let dir = TempDir::new().unwrap();
    let mut session = repl(&dir);

    assert!(session.handle_input("/remind appointment tomorrow").unwrap());
    assert!(session.handle_input("/diet suggest pizza").unwrap());
    assert!(session.handle_input("/analyze /no/such/file.png").unwrap());
    assert!(session.handle_input("/nonsense").unwrap());
    assert!(session.handle_input("/diet sugar").unwrap());

    let history = session.session().get_history(10);
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|r| !r.success));
    assert!(session.session().state().reminders.is_empty());
}

#[test]
fn test_reset_then_save_clears_file() {
    let dir = TempDir::new().unwrap();
    let store = StateStore::in_dir(dir.path());
    let mut manager = SessionManager::open(Config::default(), StateStore::in_dir(dir.path()));
    let mut display = DisplayManager::new().with_progress(false);
    let mut handler = CommandHandler::new();

    let cmd = handler.parse("/remind medicine Rinse 08:00");
    handler.execute(cmd, &mut manager, &mut display).unwrap();
    assert_eq!(store.load(&Config::default()).unwrap().reminders.len(), 1);

    handler.execute(Command::Reset, &mut manager, &mut display).unwrap();
    handler.execute(Command::Save, &mut manager, &mut display).unwrap();
    assert!(store.load(&Config::default()).unwrap().reminders.is_empty());
}
