use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Stderr spinner shown while locust runs. Cleared on drop.
pub(crate) struct RunSpinner {
    pb: ProgressBar,
}

impl RunSpinner {
    pub(crate) fn start(run_time: Duration) -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(5));
        pb.set_style(spinner_style());
        pb.set_prefix("locust");
        pb.set_message(format!(
            "running for {}",
            humantime::format_duration(run_time)
        ));
        pb.enable_steady_tick(Duration::from_millis(120));
        Self { pb }
    }

    pub(crate) fn set_message(&self, msg: impl Into<String>) {
        self.pb.set_message(msg.into());
    }

    pub(crate) fn finish(self) {
        self.pb.finish_and_clear();
    }
}

impl Drop for RunSpinner {
    fn drop(&mut self) {
        if !self.pb.is_finished() {
            self.pb.finish_and_clear();
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} {spinner} {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}
