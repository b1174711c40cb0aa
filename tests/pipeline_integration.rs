//! End-to-end turn scenarios against fake collaborators

use scan_pilot::command::{CommandId, ExecutorReply, FixedDirectory};
use scan_pilot::core::config::SearchConfig;
use scan_pilot::core::error::Result;
use scan_pilot::core::{ArgValue, PilotConfig};
use scan_pilot::llm::{CompletionService, OfflineCompletion, PromptTable};
use scan_pilot::session::{self, spawn_turn, Collaborators, Session, TurnOutcome, UiEvent, APOLOGY};
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type Calls = Arc<Mutex<Vec<(CommandId, Vec<ArgValue>)>>>;

struct Harness {
    session: Session,
    events: Receiver<UiEvent>,
    calls: Calls,
}

fn harness(llm: Arc<dyn CompletionService>, current: Option<PathBuf>) -> Harness {
    let config = PilotConfig {
        search: SearchConfig {
            include_profile_dirs: false,
            ..SearchConfig::default()
        },
        ..PilotConfig::default()
    };

    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&calls);
    let executor = move |cmd: CommandId, args: &[ArgValue]| -> Result<ExecutorReply> {
        log.lock().unwrap().push((cmd, args.to_vec()));
        Ok(ExecutorReply::ok("done"))
    };

    let (sink, events) = session::channel();
    let services = Collaborators {
        llm,
        executor: Arc::new(executor),
        directories: Arc::new(FixedDirectory(current)),
    };
    let session = Session::start(config, PromptTable::builtin(), services, sink).unwrap();
    Harness {
        session,
        events,
        calls,
    }
}

fn executed(h: &Harness) -> Vec<(CommandId, Vec<ArgValue>)> {
    h.session.wait_idle();
    h.calls.lock().unwrap().clone()
}

#[test]
fn test_open_file_in_current_directory() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("scan_01.fpd");
    fs::write(&file, b"scan").unwrap();

    let mut h = harness(Arc::new(OfflineCompletion), Some(dir.path().to_path_buf()));
    let outcome = h.session.handle_turn("open scan_01.fpd");

    let expected = file.to_string_lossy().into_owned();
    assert_eq!(
        outcome,
        TurnOutcome::Enqueued {
            commands: vec![CommandId::LoadData],
            message: format!("Opening file: {}", expected),
        }
    );
    assert_eq!(
        executed(&h),
        vec![(CommandId::LoadData, vec![ArgValue::Text(expected)])]
    );
}

#[test]
fn test_ambiguous_keyword_then_yes() {
    let mut h = harness(Arc::new(OfflineCompletion), None);

    let outcome = h.session.handle_turn("find defects");
    assert_eq!(
        outcome,
        TurnOutcome::Replied {
            message: format!(
                "{}\n\nWould you like me to run defect detection on the current file?",
                APOLOGY
            ),
            suggested: Some(CommandId::StartDefectDetection),
        }
    );
    assert!(h.session.pending().is_some());
    assert!(executed(&h).is_empty());

    let outcome = h.session.handle_turn("yes");
    assert!(matches!(outcome, TurnOutcome::Enqueued { ref commands, .. } if commands == &[CommandId::StartDefectDetection]));
    assert!(h.session.pending().is_none());
    assert_eq!(
        executed(&h),
        vec![(CommandId::StartDefectDetection, Vec::new())]
    );
}

#[test]
fn test_defect_question_gets_suggestion() {
    let llm = |_: &str, _: &str| -> Result<String> {
        Ok("Defects show up as amplitude peaks in the C-scan.".into())
    };
    let mut h = harness(Arc::new(llm), None);

    let outcome = h.session.handle_turn("how do I detect defects?");
    match outcome {
        TurnOutcome::Replied { message, suggested } => {
            assert!(message.starts_with("Defects show up"));
            assert!(message.ends_with("Would you like me to run defect detection on the current file?"));
            assert_eq!(suggested, Some(CommandId::StartDefectDetection));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(
        h.session.pending().map(|p| p.command),
        Some(CommandId::StartDefectDetection)
    );
    assert!(executed(&h).is_empty());
}

#[test]
fn test_unknown_directory_still_enqueued() {
    let mut h = harness(Arc::new(OfflineCompletion), None);

    let outcome = h.session.handle_turn("change directory to Nowhere42");
    let TurnOutcome::Enqueued { commands, message } = outcome else {
        panic!("expected enqueue");
    };
    assert_eq!(commands, vec![CommandId::SetNewDirectory]);
    assert!(message.starts_with("Changing current directory to: Nowhere42"));
    assert!(message.contains("Could not find the directory"));

    assert_eq!(
        executed(&h),
        vec![(
            CommandId::SetNewDirectory,
            vec!["Nowhere42".into(), false.into(), "".into()]
        )]
    );
}

#[test]
fn test_multiple_commands_run_in_text_order() {
    let mut h = harness(Arc::new(OfflineCompletion), None);

    h.session.handle_turn("refresh the plot and show file info");
    let names: Vec<CommandId> = executed(&h).into_iter().map(|(cmd, _)| cmd).collect();
    assert_eq!(
        names,
        vec![CommandId::UpdatePlot, CommandId::GetFileInformation]
    );
}

#[test]
fn test_llm_command_list_keeps_duplicates() {
    let llm = |_: &str, _: &str| -> Result<String> {
        Ok("updatePlot, getDirectory, updatePlot".into())
    };
    let mut h = harness(Arc::new(llm), None);

    h.session.handle_turn("redraw, list the folder, redraw again");
    let names: Vec<CommandId> = executed(&h).into_iter().map(|(cmd, _)| cmd).collect();
    assert_eq!(
        names,
        vec![
            CommandId::UpdatePlot,
            CommandId::GetDirectory,
            CommandId::UpdatePlot
        ]
    );
}

#[test]
fn test_every_turn_posts_one_message() {
    let h = harness(Arc::new(OfflineCompletion), None);
    let Harness {
        session, events, ..
    } = h;
    let session = Arc::new(Mutex::new(session));

    for text in ["what is a phased array?", "snr", "no", "refresh the plot"] {
        spawn_turn(&session, text).join().unwrap();
    }
    session.lock().unwrap().wait_idle();

    let visible = events
        .try_iter()
        .filter(|e| !matches!(e, UiEvent::Executed(_)))
        .count();
    assert_eq!(visible, 4);
}
