//! Commands reach the application strictly in queue order

use scan_pilot::command::{CommandId, ExecutorReply};
use scan_pilot::core::error::Result;
use scan_pilot::core::{ArgValue, CommandRequest};
use scan_pilot::session::{self, CommandQueue, Dispatcher, UiEvent};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Start(CommandId),
    End(CommandId),
}

#[test]
fn test_slow_command_does_not_reorder() {
    let (sink, rx) = session::channel();
    let queue = Arc::new(CommandQueue::new());
    let marks = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&marks);
    let executor = move |cmd: CommandId, _: &[ArgValue]| -> Result<ExecutorReply> {
        log.lock().unwrap().push(Mark::Start(cmd));
        if cmd == CommandId::GetDirectory {
            thread::sleep(Duration::from_millis(80));
        }
        log.lock().unwrap().push(Mark::End(cmd));
        Ok(ExecutorReply::ok(cmd.name()))
    };
    let mut handle = Dispatcher::new(Arc::clone(&queue), Arc::new(executor), sink)
        .spawn()
        .unwrap();

    let order = [
        CommandId::UpdatePlot,
        CommandId::GetDirectory,
        CommandId::DoAnalysisSnr,
    ];
    for cmd in order {
        queue
            .push(CommandRequest::new(cmd, Vec::new(), "").unwrap())
            .unwrap();
    }
    queue.wait_idle();
    handle.stop();

    // Each command finishes before the next one starts
    let expected: Vec<Mark> = order
        .iter()
        .flat_map(|cmd| [Mark::Start(*cmd), Mark::End(*cmd)])
        .collect();
    assert_eq!(*marks.lock().unwrap(), expected);

    let reported: Vec<CommandId> = rx
        .try_iter()
        .filter_map(|e| match e {
            UiEvent::Executed(result) => Some(result.command),
            _ => None,
        })
        .collect();
    assert_eq!(reported, order);
}

#[test]
fn test_producers_on_many_threads() {
    let (sink, _rx) = session::channel();
    let queue = Arc::new(CommandQueue::new());
    let count = Arc::new(Mutex::new(0usize));

    let counter = Arc::clone(&count);
    let executor = move |_: CommandId, _: &[ArgValue]| -> Result<ExecutorReply> {
        *counter.lock().unwrap() += 1;
        Ok(ExecutorReply::ok(""))
    };
    let mut handle = Dispatcher::new(Arc::clone(&queue), Arc::new(executor), sink)
        .spawn()
        .unwrap();

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for _ in 0..5 {
                    queue
                        .push(CommandRequest::new(CommandId::UpdatePlot, Vec::new(), "").unwrap())
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    queue.wait_idle();
    handle.stop();

    assert_eq!(*count.lock().unwrap(), 20);
}
