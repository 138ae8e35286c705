//! Terminal rendering of progress events.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use memeraki_core::{LogReporter, ProgressEvent, ProgressReporter};

/// Failed-batch id lists are cut after this many ids.
const MAX_LISTED_IDS: usize = 10;

/// Line-oriented operator output on stderr, with an optional progress bar.
pub struct TerminalReporter {
    show_bar: bool,
    log_data: bool,
    bar: Option<ProgressBar>,
}

impl TerminalReporter {
    pub fn new(show_bar: bool, log_data: bool) -> Self {
        Self {
            show_bar,
            log_data,
            bar: None,
        }
    }

    fn println(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn start_bar(&mut self, total_rows: Option<usize>) {
        let bar = match total_rows {
            Some(total) => ProgressBar::new(total as u64),
            None => ProgressBar::new_spinner(),
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        self.bar = Some(bar);
    }
}

impl ProgressReporter for TerminalReporter {
    fn report(&mut self, event: &ProgressEvent) {
        match event {
            ProgressEvent::RunStarted { total_rows, .. } if self.show_bar => {
                self.start_bar(*total_rows);
            }
            ProgressEvent::RowRead { .. } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
            }
            ProgressEvent::BatchCommitted { index, .. } => {
                if let Some(bar) = &self.bar {
                    bar.set_message(format!("batch {index} committed"));
                }
            }
            ProgressEvent::RunComplete(_) => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
            _ => {}
        }
        if let Some(line) = render_event(event, self.log_data) {
            self.println(&line);
        }
    }
}

/// Human-readable line for an event, or `None` for events shown only on
/// the progress bar.
pub fn render_event(event: &ProgressEvent, log_data: bool) -> Option<String> {
    match event {
        ProgressEvent::RunStarted {
            pipeline,
            collection,
            total_rows,
        } => Some(match total_rows {
            Some(total) => format!("Uploading {total} {} rows into '{collection}'", pipeline.label()),
            None => format!("Uploading {} rows into '{collection}'", pipeline.label()),
        }),
        ProgressEvent::RowRead { .. } | ProgressEvent::RunComplete(_) => None,
        ProgressEvent::RowRejected(err) => Some(format!(
            "  rejected {}",
            if log_data {
                err.detailed()
            } else {
                err.to_string()
            }
        )),
        ProgressEvent::BatchCommitted {
            index,
            size,
            created,
        } => Some(format!(
            "  batch {index}: committed {size} documents ({created} new, {} updated)",
            size - created
        )),
        ProgressEvent::BatchFailed(err) => {
            let mut ids: Vec<&str> = err
                .document_ids
                .iter()
                .take(MAX_LISTED_IDS)
                .map(|id| id.as_str())
                .collect();
            let hidden = err.document_ids.len().saturating_sub(MAX_LISTED_IDS);
            let more = format!("... {hidden} more");
            if hidden > 0 {
                ids.push(&more);
            }
            Some(format!(
                "  batch {}: FAILED after {} attempt(s), {} documents not written: {}\n    ids: {}",
                err.batch_index,
                err.attempts,
                err.document_ids.len(),
                err.source,
                ids.join(", ")
            ))
        }
    }
}

/// Sends every event to each inner reporter in turn.
#[derive(Default)]
pub struct FanoutReporter {
    reporters: Vec<Box<dyn ProgressReporter>>,
}

impl FanoutReporter {
    #[must_use]
    pub fn with(mut self, reporter: impl ProgressReporter + 'static) -> Self {
        self.reporters.push(Box::new(reporter));
        self
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }
}

impl ProgressReporter for FanoutReporter {
    fn report(&mut self, event: &ProgressEvent) {
        for reporter in &mut self.reporters {
            reporter.report(event);
        }
    }
}

/// Pick reporters for the run.
///
/// Human lines go to the terminal unless logs are JSON on stderr, in which
/// case the log stream is the only output. Logs in a file always get the
/// events as well.
pub fn build_reporter(
    json_logs: bool,
    logs_to_file: bool,
    show_bar: bool,
    log_data: bool,
) -> FanoutReporter {
    let mut fanout = FanoutReporter::default();
    if !json_logs || logs_to_file {
        fanout = fanout.with(TerminalReporter::new(show_bar, log_data));
    }
    if json_logs || logs_to_file {
        fanout = fanout.with(LogReporter::new(log_data));
    }
    fanout
}

#[cfg(test)]
mod tests {
    use memeraki_core::{CommitError, RowError};
    use memeraki_model::{DocumentId, FieldIssue, IssueKind, PipelineKind, ValidationError};
    use memeraki_store::StoreError;

    use super::*;

    fn rejected() -> ProgressEvent {
        ProgressEvent::RowRejected(RowError::Validation(ValidationError {
            line: 4,
            issues: vec![FieldIssue::invalid(
                "years_of_practice",
                IssueKind::NotInteger,
                "twelve",
            )],
        }))
    }

    #[test]
    fn rejection_hides_values_unless_enabled() {
        let hidden = render_event(&rejected(), false).unwrap();
        assert!(hidden.contains("line 4"));
        assert!(hidden.contains("years_of_practice"));
        assert!(!hidden.contains("twelve"));
        assert!(render_event(&rejected(), true).unwrap().contains("twelve"));
    }

    #[test]
    fn failed_batch_lists_ids() {
        let ids: Vec<DocumentId> = (0..12)
            .map(|n| DocumentId::new(format!("artist-{n}")).unwrap())
            .collect();
        let event = ProgressEvent::BatchFailed(CommitError {
            batch_index: 2,
            lines: (2..14).collect(),
            document_ids: ids,
            attempts: 5,
            source: StoreError::Unavailable {
                status: 503,
                message: "backend unavailable".to_string(),
            },
        });
        let line = render_event(&event, false).unwrap();
        assert!(line.starts_with("  batch 2: FAILED after 5 attempt(s), 12 documents"));
        assert!(line.contains("artist-0, artist-1"));
        assert!(line.contains("... 2 more"));
        assert!(!line.contains("artist-11"));
    }

    #[test]
    fn committed_batch_splits_new_and_updated() {
        let event = ProgressEvent::BatchCommitted {
            index: 3,
            size: 500,
            created: 12,
        };
        assert_eq!(
            render_event(&event, false).unwrap(),
            "  batch 3: committed 500 documents (12 new, 488 updated)"
        );
    }

    #[test]
    fn run_started_mentions_collection() {
        let event = ProgressEvent::RunStarted {
            pipeline: PipelineKind::Artforms,
            collection: "artforms".to_string(),
            total_rows: Some(3),
        };
        let line = render_event(&event, false).unwrap();
        assert!(line.contains("3"));
        assert!(line.contains("'artforms'"));
    }

    #[test]
    fn reporter_selection() {
        assert_eq!(build_reporter(false, false, false, false).len(), 1);
        assert_eq!(build_reporter(true, false, false, false).len(), 1);
        assert_eq!(build_reporter(false, true, false, false).len(), 2);
        assert_eq!(build_reporter(true, true, false, false).len(), 2);
    }
}
