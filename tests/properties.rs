//! Property tests for classification, extraction, scoring and search

use proptest::prelude::*;
use scan_pilot::command::keywords::ACTION_VERBS;
use scan_pilot::command::{classify, CommandExtractor, CommandId, ExecutorReply, FixedDirectory, Intent};
use scan_pilot::core::config::{ConfirmationConfig, SearchConfig};
use scan_pilot::core::error::Result;
use scan_pilot::core::{ArgValue, Language, PilotConfig};
use scan_pilot::llm::parser::parse_command_list;
use scan_pilot::llm::{OfflineCompletion, PromptTable};
use scan_pilot::search::{score, Locator, SearchScope};
use scan_pilot::session::{self, Collaborators, Session};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn command_id() -> impl Strategy<Value = CommandId> {
    prop::sample::select(CommandId::ALL.to_vec())
}

fn unknown_token() -> impl Strategy<Value = String> {
    "[a-z]{3,12}".prop_filter("must not name a command", |t| CommandId::lookup(t).is_none())
}

proptest! {
    #[test]
    fn questions_without_action_verbs_are_chat(words in prop::collection::vec("[a-z]{1,8}", 0..8)) {
        prop_assume!(!words.iter().any(|w| ACTION_VERBS.contains(&w.as_str())));
        let text = format!("{}?", words.join(" "));
        prop_assert_eq!(classify(&text), Intent::Chat);
    }

    #[test]
    fn known_commands_keep_order_and_duplicates(commands in prop::collection::vec(command_id(), 1..8)) {
        let response = commands.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ");

        let parsed = parse_command_list(&response);
        prop_assert_eq!(&parsed.commands, &commands);
        prop_assert!(parsed.unknown.is_empty());

        let prompts = PromptTable::builtin();
        let llm = move |_: &str, _: &str| -> Result<String> { Ok(response.clone()) };
        let extractor = CommandExtractor::new(&llm, &prompts);
        prop_assert_eq!(extractor.extract("do these", Language::English), commands);
    }

    #[test]
    fn unknown_tokens_are_filtered(
        mixed in prop::collection::vec(
            prop_oneof![
                command_id().prop_map(|c| c.name().to_string()),
                unknown_token(),
            ],
            0..10,
        )
    ) {
        let parsed = parse_command_list(&mixed.join(","));
        let known: Vec<CommandId> = mixed.iter().filter_map(|t| CommandId::lookup(t)).collect();
        let unknown = mixed.iter().filter(|t| CommandId::lookup(t).is_none()).count();
        prop_assert_eq!(parsed.commands, known);
        prop_assert_eq!(parsed.unknown.len(), unknown);
    }

    #[test]
    fn self_match_scores_one(query in "[A-Za-z0-9_-]{1,24}") {
        prop_assert!((score(&query, &query) - 1.0).abs() < 1e-9);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn search_stays_inside_scope(form in 0u8..5, name in "[a-z0-9_]{1,8}") {
        let root = TempDir::new().unwrap();
        let inside = root.path().join("inside");
        let outside = root.path().join("outside");
        fs::create_dir_all(inside.join("run_2")).unwrap();
        fs::create_dir_all(outside.join(&name)).unwrap();
        for file in ["scan_01.fpd", "D25-28_01.opd", "weld.fpd"] {
            fs::write(inside.join(file), b"").unwrap();
            fs::write(outside.join(file), b"").unwrap();
        }
        fs::write(inside.join("run_2").join("scan_02.fpd"), b"").unwrap();
        fs::write(outside.join(format!("{}.fpd", name)), b"").unwrap();

        let query = match form {
            0 => name.clone(),
            1 => format!("../outside/{}", name),
            2 => "..".to_string(),
            3 => outside.join(&name).to_string_lossy().into_owned(),
            _ => format!("{}.fpd", outside.join(&name).to_string_lossy()),
        };

        let config = SearchConfig::default();
        let scope = SearchScope::from_entries([inside.clone()]);
        let locator = Locator::new(&config);
        let inside_real = inside.canonicalize().unwrap();
        let results = locator
            .search_files(&query, &scope, &config.extensions)
            .into_iter()
            .chain(locator.search_directories(&query, &scope));
        for candidate in results {
            let real = candidate.path.canonicalize().unwrap();
            prop_assert!(real.starts_with(&inside_real), "{:?} escaped the scope", candidate.path);
        }
    }

    #[test]
    fn affirmative_without_pending_enqueues_nothing(
        token in prop::sample::select(ConfirmationConfig::default().affirmative)
    ) {
        let calls = Arc::new(std::sync::Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let executor = move |_: CommandId, _: &[ArgValue]| -> Result<ExecutorReply> {
            *counter.lock().unwrap() += 1;
            Ok(ExecutorReply::ok(""))
        };
        let config = PilotConfig {
            search: SearchConfig { include_profile_dirs: false, ..SearchConfig::default() },
            ..PilotConfig::default()
        };
        let services = Collaborators {
            llm: Arc::new(OfflineCompletion),
            executor: Arc::new(executor),
            directories: Arc::new(FixedDirectory(None)),
        };
        let (sink, _rx) = session::channel();
        let mut session = Session::start(config, PromptTable::builtin(), services, sink).unwrap();

        session.handle_turn(&token.to_uppercase());
        session.wait_idle();
        prop_assert_eq!(*calls.lock().unwrap(), 0);
        prop_assert!(session.pending().is_none());
    }
}
