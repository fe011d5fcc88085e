use std::path::Path;
use std::sync::Arc;

use chatbench_core::testing::{ScriptedBackend, ScriptedClient};
use chatbench_core::{
    ChatSession, ChatbenchError, ContextMatrix, ConversationClient, MessageRole, Prompt,
    ResponseRecord, Result, ResultSink,
};
use chatbench_execution::{BatchRunner, CancellationToken, SweepEvent, SweepSummary};
use tokio::sync::{Mutex, mpsc};

fn prompts(count: usize) -> Vec<Prompt> {
    (1..=count)
        .filter_map(|i| Prompt::parse(&format!("prompt {i}")))
        .collect()
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

#[tokio::test]
async fn sink_holds_header_plus_one_row_per_call() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");
    let prompts = prompts(4);
    let runner = BatchRunner::new(ContextMatrix::default());
    let client = Mutex::new(ScriptedClient::new());

    let summary = runner.run_to_file(&prompts, &client, &output).await.unwrap();

    assert_eq!(summary.total, 20);
    assert_eq!(summary.succeeded, 20);
    assert_eq!(client.lock().await.sent().len(), 20);

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 1 + 20);
    assert_eq!(rows[0], ["Prompt", "Context", "Response"]);

    let contexts = ContextMatrix::default();
    for (i, row) in rows[1..].iter().enumerate() {
        assert_eq!(row[0], prompts[i / 5].as_str());
        assert_eq!(row[1], contexts.contexts()[i % 5]);
        assert_eq!(row[2], format!("reply #{i}"));
    }
}

#[tokio::test]
async fn rerun_replaces_previous_results() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");
    let prompts = prompts(3);
    let runner = BatchRunner::new(ContextMatrix::default());
    let client = Mutex::new(ScriptedClient::new());

    runner.run_to_file(&prompts, &client, &output).await.unwrap();
    runner.run_to_file(&prompts, &client, &output).await.unwrap();

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 1 + 15);
    // The second run's replies are numbered after the first run's calls.
    assert_eq!(rows[1][2], "reply #15");
}

#[tokio::test]
async fn failed_call_becomes_marker_row_and_sweep_continues() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");
    let prompts = prompts(2);
    let runner = BatchRunner::new(ContextMatrix::default());
    let client = Mutex::new(ScriptedClient::new().failing_on(&[6]));

    let summary = runner.run_to_file(&prompts, &client, &output).await.unwrap();

    assert_eq!(summary.succeeded, 9);
    assert_eq!(summary.failed, 1);
    assert!(!summary.cancelled);

    let rows = read_csv(&output);
    assert_eq!(rows.len(), 1 + 10);
    let data = &rows[1..];
    assert!(data[6][2].starts_with("[ERROR]"));
    assert!(data[6][2].contains("scripted failure #6"));
    assert_eq!(data[6][0], "prompt 2");
    assert_eq!(data[6][1], ContextMatrix::default().contexts()[1]);
    assert_eq!(
        data.iter().filter(|row| row[2].starts_with("[ERROR]")).count(),
        1
    );
    assert_eq!(data[7][2], "reply #7");
}

#[tokio::test]
async fn events_arrive_in_call_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = BatchRunner::new(ContextMatrix::new(["", "C"])).with_events(tx);
    let client = Mutex::new(ScriptedClient::new().failing_on(&[1]));
    let mut rows: Vec<ResponseRecord> = Vec::new();

    runner.run(&prompts(1), &client, &mut rows).await.unwrap();
    drop(runner);

    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }

    assert_eq!(events.len(), 4);
    assert_eq!(events[0], SweepEvent::Started { total: 2 });
    assert!(matches!(&events[1], SweepEvent::Completed { index: 0, total: 2, record } if record.response == "reply #0"));
    assert!(matches!(&events[2], SweepEvent::Failed { index: 1, error, .. } if error.is_service()));
    assert_eq!(
        events[3],
        SweepEvent::Finished(SweepSummary {
            total: 2,
            succeeded: 1,
            failed: 1,
            cancelled: false,
        })
    );
}

#[tokio::test]
async fn cancellation_stops_between_calls_and_keeps_rows() {
    let token = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = BatchRunner::new(ContextMatrix::default())
        .with_events(tx)
        .with_cancellation(token.clone());
    let client = Arc::new(Mutex::new(ScriptedClient::new()));
    let prompts = prompts(3);

    // Hold the session so the sweep blocks on its first call.
    let guard = client.lock().await;
    let task = {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            let mut rows: Vec<ResponseRecord> = Vec::new();
            let summary = runner.run(&prompts, &*client, &mut rows).await;
            (summary, rows)
        })
    };

    assert_eq!(rx.recv().await, Some(SweepEvent::Started { total: 15 }));
    token.cancel();
    drop(guard);

    let (summary, rows) = task.await.unwrap();
    let summary = summary.unwrap();
    assert!(summary.cancelled);
    // The call already waiting on the session completes; nothing after it runs.
    assert_eq!(summary.completed(), 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(client.lock().await.sent().len(), 1);
}

/// Sink that accepts `capacity` rows and then fails.
struct FailingSink {
    capacity: usize,
    rows: Vec<ResponseRecord>,
}

impl ResultSink for FailingSink {
    fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        if self.rows.len() >= self.capacity {
            return Err(ChatbenchError::output("results.csv", "disk full"));
        }
        self.rows.push(record.clone());
        Ok(())
    }
}

#[tokio::test]
async fn sink_failure_aborts_and_keeps_written_rows() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = BatchRunner::new(ContextMatrix::default()).with_events(tx);
    let client = Mutex::new(ScriptedClient::new());
    let mut sink = FailingSink {
        capacity: 3,
        rows: Vec::new(),
    };

    let err = runner.run(&prompts(2), &client, &mut sink).await.unwrap_err();
    drop(runner);

    assert!(err.is_output());
    assert_eq!(sink.rows.len(), 3);
    // The fourth call reached the service before the write failed.
    assert_eq!(client.lock().await.sent().len(), 4);

    let mut last = None;
    while let Some(event) = rx.recv().await {
        last = Some(event);
    }
    assert!(matches!(last, Some(SweepEvent::Aborted { error }) if error.is_output()));
}

#[tokio::test]
async fn unwritable_output_path_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    let runner = BatchRunner::new(ContextMatrix::default());
    let client = Mutex::new(ScriptedClient::new());

    let err = runner
        .run_to_file(&prompts(1), &client, dir.path())
        .await
        .unwrap_err();

    assert!(err.is_output());
    assert!(client.lock().await.sent().is_empty());
}

#[tokio::test]
async fn sweep_and_interactive_turns_share_one_history() {
    let session = Arc::new(Mutex::new(ChatSession::new(ScriptedBackend::echo())));
    let runner = BatchRunner::new(ContextMatrix::new(["", "C"]));
    let mut rows: Vec<ResponseRecord> = Vec::new();

    session.lock().await.send("hello").await.unwrap();
    runner.run(&prompts(1), &*session, &mut rows).await.unwrap();
    session.lock().await.send("thanks").await.unwrap();

    let session = session.lock().await;
    let contents: Vec<(MessageRole, &str)> = session
        .history()
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        contents,
        [
            (MessageRole::User, "hello"),
            (MessageRole::Model, "echo: hello"),
            (MessageRole::User, "prompt 1"),
            (MessageRole::Model, "echo: prompt 1"),
            (MessageRole::User, "C\nprompt 1"),
            (MessageRole::Model, "echo: C\nprompt 1"),
            (MessageRole::User, "thanks"),
            (MessageRole::Model, "echo: thanks"),
        ]
    );
    assert_eq!(rows[1].response, "echo: C\nprompt 1");
}

fn assert_send<T: Send>(_: &T) {}

#[tokio::test]
async fn file_sweep_runs_as_a_spawned_task() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("results.csv");
    let session = Arc::new(Mutex::new(ChatSession::new(ScriptedBackend::echo())));
    let runner = BatchRunner::new(ContextMatrix::new(["", "C"]));
    let prompts = Arc::new(prompts(2));

    {
        let pending_output = output.clone();
        let future = runner.run_to_file(&prompts, &*session, &pending_output);
        assert_send(&future);
    }

    let task = {
        let session = Arc::clone(&session);
        let output = output.clone();
        tokio::spawn(async move { runner.run_to_file(&prompts, &*session, &output).await })
    };

    let summary = task.await.unwrap().unwrap();
    assert_eq!(summary.succeeded, 4);
    assert_eq!(read_csv(&output).len(), 5);
    assert_eq!(session.lock().await.history().len(), 8);
}
