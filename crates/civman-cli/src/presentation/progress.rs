//! Terminal rendering of download queue events.
//!
//! On a terminal each task gets an indicatif bar inside one `MultiProgress`.
//! Otherwise plain lines are printed on stage changes and every 25%.

use std::collections::HashMap;
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use civman_core::{DownloadStatus, DownloadTask, QueueEvent, QueueEventEmitterPort, TaskStage};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::tables::truncate_string;

const LABEL_WIDTH: usize = 36;
const PLAIN_STEP: u8 = 25;

/// Queue observer that draws progress for the `download` command.
pub struct QueueProgressRenderer {
    inner: Render,
}

enum Render {
    Fancy(FancyRender),
    Plain(PlainRender),
}

impl QueueProgressRenderer {
    /// Create a renderer, auto-detecting terminal capability.
    pub fn new() -> Self {
        let inner = if io::stdout().is_terminal() {
            Render::Fancy(FancyRender::new())
        } else {
            Render::Plain(PlainRender::default())
        };
        Self { inner }
    }

    /// Remove any bars still drawn.
    pub fn finish(&self) {
        if let Render::Fancy(inner) = &self.inner {
            inner.finish();
        }
    }
}

impl Default for QueueProgressRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueEventEmitterPort for QueueProgressRenderer {
    fn emit(&self, event: QueueEvent) {
        match &self.inner {
            Render::Fancy(inner) => inner.handle(&event),
            Render::Plain(inner) => inner.handle(&event),
        }
    }
}

/// Which percentage describes the task right now.
fn visible_percent(task: &DownloadTask) -> Option<u8> {
    match task.stage {
        TaskStage::DownloadingImages => task.image_progress,
        TaskStage::DownloadingFile => task.model_progress,
        TaskStage::Completed => Some(100),
        _ => None,
    }
}

fn task_label(task: &DownloadTask) -> String {
    let label = task.model_name.as_deref().unwrap_or(&task.url);
    truncate_string(label, LABEL_WIDTH)
}

fn outcome_line(task: &DownloadTask) -> String {
    let label = task.model_name.as_deref().unwrap_or(&task.url);
    match (task.status, task.message.as_deref()) {
        (DownloadStatus::Completed, _) => format!("✔ {label}"),
        (DownloadStatus::Canceled, _) => format!("⊘ {label}: canceled"),
        (_, Some(message)) => format!("✘ {label}: {message}"),
        (status, None) => format!("✘ {label}: {status}"),
    }
}

// ============================================================================
// Fancy Terminal Progress (indicatif)
// ============================================================================

struct FancyRender {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl FancyRender {
    fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template("{prefix:<36} [{bar:28.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
    }

    fn handle(&self, event: &QueueEvent) {
        let mut bars = self
            .bars
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match event {
            QueueEvent::TaskChanged { task } => {
                if task.status.is_terminal() {
                    if let Some(bar) = bars.remove(&task.url) {
                        bar.finish_and_clear();
                    }
                    let _ = self.multi.println(outcome_line(task));
                    return;
                }
                let bar = bars.entry(task.url.clone()).or_insert_with(|| {
                    let bar = self.multi.add(ProgressBar::new(100));
                    bar.set_style(Self::style());
                    bar
                });
                bar.set_prefix(task_label(task));
                bar.set_message(task.stage.label());
                if let Some(percent) = visible_percent(task) {
                    bar.set_position(u64::from(percent));
                }
            }
            QueueEvent::StageChanged { url, stage } => {
                if let Some(bar) = bars.get(url) {
                    bar.set_message(stage.label());
                    if matches!(stage, TaskStage::DownloadingFile | TaskStage::DownloadingImages) {
                        bar.set_position(0);
                    }
                }
            }
            QueueEvent::QueueChanged { .. } => {}
        }
    }

    fn finish(&self) {
        let mut bars = self
            .bars
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for (_, bar) in bars.drain() {
            bar.finish_and_clear();
        }
    }
}

// ============================================================================
// Plain Progress (non-terminal)
// ============================================================================

#[derive(Default)]
struct PlainRender {
    last_step: Mutex<HashMap<String, (TaskStage, u8)>>,
}

impl PlainRender {
    fn handle(&self, event: &QueueEvent) {
        if let Some(line) = self.line_for(event) {
            println!("{line}");
        }
    }

    fn line_for(&self, event: &QueueEvent) -> Option<String> {
        let mut seen = self
            .last_step
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match event {
            QueueEvent::TaskChanged { task } if task.status.is_terminal() => {
                seen.remove(&task.url);
                Some(outcome_line(task))
            }
            QueueEvent::TaskChanged { task } => {
                let percent = visible_percent(task)?;
                let step = percent - percent % PLAIN_STEP;
                let previous = seen.insert(task.url.clone(), (task.stage, step));
                if previous == Some((task.stage, step)) {
                    return None;
                }
                Some(format!(
                    "  {} {}: {percent}%",
                    task_label(task),
                    task.stage.label()
                ))
            }
            QueueEvent::StageChanged { url, stage } => {
                Some(format!("[{}] {}", truncate_string(url, 60), stage.label()))
            }
            QueueEvent::QueueChanged { active, total } if *total > 0 => {
                Some(format!("Queue: {active} active, {total} total"))
            }
            QueueEvent::QueueChanged { .. } => None,
        }
    }
}
