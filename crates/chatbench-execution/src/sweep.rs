//! The prompt x context sweep.

use chatbench_core::{
    ChatbenchError, ContextMatrix, ConversationClient, Prompt, ResponseRecord, Result,
    ResultSink, compose_message,
};
use chatbench_infrastructure::CsvResultSink;
use std::path::Path;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;

/// Progress notifications streamed to a display while a sweep runs.
#[derive(Debug, Clone, PartialEq)]
pub enum SweepEvent {
    /// The sweep is about to make `total` calls.
    Started { total: usize },
    /// Call `index` (0-based) succeeded and its row was written.
    Completed {
        index: usize,
        total: usize,
        record: ResponseRecord,
    },
    /// Call `index` failed; an error-marker row was written in its place.
    Failed {
        index: usize,
        total: usize,
        record: ResponseRecord,
        error: ChatbenchError,
    },
    /// Every call ran, or the sweep was cancelled between calls.
    Finished(SweepSummary),
    /// The results file could not be written; the sweep stopped.
    Aborted { error: ChatbenchError },
}

/// Outcome counts of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepSummary {
    /// Calls the full matrix requires.
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// True when cancellation stopped the sweep before `total` calls.
    pub cancelled: bool,
}

impl SweepSummary {
    /// Rows written to the sink.
    pub fn completed(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Drives every (prompt, context) pair through a conversation, one call at a
/// time, writing one row per call.
///
/// Prompts form the outer loop and contexts the inner loop. For each pair the
/// runner sends the composed message, appends the row, then notifies the
/// event channel, in that order. A failed call is logged and recorded as an
/// error-marker row and the sweep continues; a sink failure aborts it.
///
/// Cancellation is honoured between calls only, so the session never holds a
/// half-finished turn.
pub struct BatchRunner {
    contexts: ContextMatrix,
    events: Option<mpsc::UnboundedSender<SweepEvent>>,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(contexts: ContextMatrix) -> Self {
        Self {
            contexts,
            events: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Streams progress to `sender`. A closed receiver is ignored.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<SweepEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn contexts(&self) -> &ContextMatrix {
        &self.contexts
    }

    /// Number of calls a sweep over `prompts` makes.
    pub fn total_calls(&self, prompts: &[Prompt]) -> usize {
        prompts.len() * self.contexts.len()
    }

    /// Runs the sweep against `client`, writing rows to `sink`.
    ///
    /// The client lock is taken once per call, so other users of the same
    /// session (interactive turns) interleave between sweep calls.
    ///
    /// # Returns
    ///
    /// - `Ok(summary)`: all calls ran (some may have failed) or the sweep was
    ///   cancelled
    /// - `Err(ChatbenchError::Output)`: a row could not be written; rows
    ///   already written stay in the sink
    pub async fn run<C, S>(
        &self,
        prompts: &[Prompt],
        client: &Mutex<C>,
        sink: &mut S,
    ) -> Result<SweepSummary>
    where
        C: ConversationClient + ?Sized,
        S: ResultSink + ?Sized,
    {
        let total = self.total_calls(prompts);
        let mut summary = SweepSummary {
            total,
            ..SweepSummary::default()
        };

        tracing::info!(
            prompts = prompts.len(),
            contexts = self.contexts.len(),
            total,
            "Starting sweep"
        );
        self.emit(SweepEvent::Started { total });

        // Collected up front so the sweep future stays `Send`.
        let pairs: Vec<(&Prompt, &str)> = prompts
            .iter()
            .flat_map(|prompt| {
                self.contexts
                    .contexts()
                    .iter()
                    .map(move |context| (prompt, context.as_str()))
            })
            .collect();

        for (index, (prompt, context)) in pairs.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(completed = index, total, "Sweep cancelled");
                summary.cancelled = true;
                break;
            }

            let message = compose_message(context, prompt);
            tracing::debug!(index, total, "Sending sweep message");

            let outcome = {
                let mut client = client.lock().await;
                client.send(&message).await
            };

            let event = match outcome {
                Ok(response) => {
                    let record = ResponseRecord::new(prompt.as_str(), context, response);
                    self.write(sink, &record)?;
                    summary.succeeded += 1;
                    SweepEvent::Completed {
                        index,
                        total,
                        record,
                    }
                }
                Err(error) => {
                    tracing::warn!(index, total, "Sweep call failed: {}", error);
                    let record = ResponseRecord::failed(prompt.as_str(), context, &error);
                    self.write(sink, &record)?;
                    summary.failed += 1;
                    SweepEvent::Failed {
                        index,
                        total,
                        record,
                        error,
                    }
                }
            };
            self.emit(event);
        }

        tracing::info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            cancelled = summary.cancelled,
            "Sweep finished"
        );
        self.emit(SweepEvent::Finished(summary));
        Ok(summary)
    }

    /// Runs the sweep into a fresh CSV file at `path`, replacing any earlier
    /// results there.
    pub async fn run_to_file<C>(
        &self,
        prompts: &[Prompt],
        client: &Mutex<C>,
        path: &Path,
    ) -> Result<SweepSummary>
    where
        C: ConversationClient + ?Sized,
    {
        let mut sink = match CsvResultSink::create(path) {
            Ok(sink) => sink,
            Err(error) => {
                tracing::error!("Cannot open results file: {}", error);
                self.emit(SweepEvent::Aborted {
                    error: error.clone(),
                });
                return Err(error);
            }
        };
        let summary = self.run(prompts, client, &mut sink).await?;
        tracing::info!(
            path = %sink.path().display(),
            rows = sink.rows_written(),
            "Results written"
        );
        Ok(summary)
    }

    fn write<S: ResultSink + ?Sized>(&self, sink: &mut S, record: &ResponseRecord) -> Result<()> {
        sink.append(record).map_err(|error| {
            tracing::error!("Aborting sweep: {}", error);
            self.emit(SweepEvent::Aborted {
                error: error.clone(),
            });
            error
        })
    }

    fn emit(&self, event: SweepEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}
