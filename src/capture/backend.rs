//! Render backend selection and invocation
//!
//! The external render tool is the only feedback channel we have: exit
//! status plus stderr text. A specific stderr signature means the primary
//! browser engine cannot render the page, which is worth one retry on the
//! fallback engine; anything else is terminal for this run.

use crate::capture::RenderRequest;
use crate::config::CaptureConfig;
use std::process::Output;
use tokio::process::Command;

/// The two render backends, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderBackend {
    /// The tool's default browser engine
    Primary,
    /// The configured alternate engine, used once per reference when the
    /// primary reports the incompatibility signature
    Fallback,
}

/// Structured classification of one render invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The tool exited zero; the screenshot file exists
    Success,
    /// The tool failed with the known incompatibility signature
    Incompatible { stderr: String },
    /// Any other failure, including failing to spawn the tool
    Failed { reason: String },
}

impl RenderBackend {
    /// Builds the tool invocation for this backend
    pub fn command(&self, config: &CaptureConfig, request: &RenderRequest) -> Command {
        let mut command = Command::new(&config.command);
        command
            .arg(&request.target_url)
            .arg("-o")
            .arg(&request.output_path)
            .arg("--quality")
            .arg(config.quality.to_string())
            .arg("--wait")
            .arg(config.wait_ms.to_string())
            .arg("--width")
            .arg(config.width.to_string())
            .arg("--user-agent")
            .arg(&request.user_agent);

        if let RenderBackend::Fallback = self {
            command.arg("-b").arg(&config.fallback_browser);
        }

        command.kill_on_drop(true);
        command
    }
}

/// Classifies a finished tool invocation
///
/// Substring detection on stderr is retained because the tool provides no
/// structured error channel.
pub fn classify_output(output: &Output, incompatibility_marker: &str) -> RenderOutcome {
    if output.status.success() {
        return RenderOutcome::Success;
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if stderr.contains(incompatibility_marker) {
        RenderOutcome::Incompatible { stderr }
    } else {
        RenderOutcome::Failed {
            reason: format!("exit status {}: {}", output.status, stderr.trim()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn capture_config() -> CaptureConfig {
        CaptureConfig {
            screenshot_dir: "./screenshots".to_string(),
            command: "shot-scraper".to_string(),
            fallback_browser: "firefox".to_string(),
            incompatibility_marker: "Protocol error".to_string(),
            width: 1280,
            wait_ms: 4000,
            quality: 60,
            post_capture_pause_secs: 10,
        }
    }

    fn request() -> RenderRequest {
        RenderRequest {
            target_url: "https://stats.example.org/visualisations/dvc42/chart".to_string(),
            output_path: PathBuf::from("./screenshots/0.png"),
            user_agent: "Relsnap/1.0 (+https://example.com; a@b.com)".to_string(),
        }
    }

    fn args_of(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_primary_command_arguments() {
        let command = RenderBackend::Primary.command(&capture_config(), &request());
        let args = args_of(&command);

        assert_eq!(
            args[0],
            "https://stats.example.org/visualisations/dvc42/chart"
        );
        assert!(args.windows(2).any(|w| w == ["--quality", "60"]));
        assert!(args.windows(2).any(|w| w == ["--wait", "4000"]));
        assert!(args.windows(2).any(|w| w == ["--width", "1280"]));
        assert!(!args.contains(&"-b".to_string()));
    }

    #[test]
    fn test_fallback_command_selects_alternate_browser() {
        let command = RenderBackend::Fallback.command(&capture_config(), &request());
        let args = args_of(&command);
        assert!(args.windows(2).any(|w| w == ["-b", "firefox"]));
    }

    #[cfg(unix)]
    mod classify {
        use super::*;
        use std::os::unix::process::ExitStatusExt;
        use std::process::ExitStatus;

        fn output(code: i32, stderr: &str) -> Output {
            Output {
                status: ExitStatus::from_raw(code << 8),
                stdout: Vec::new(),
                stderr: stderr.as_bytes().to_vec(),
            }
        }

        #[test]
        fn test_exit_zero_is_success() {
            let outcome = classify_output(&output(0, ""), "Protocol error");
            assert_eq!(outcome, RenderOutcome::Success);
        }

        #[test]
        fn test_marker_in_stderr_is_incompatible() {
            let outcome = classify_output(
                &output(1, "browser crashed: Protocol error (Page.captureScreenshot)"),
                "Protocol error",
            );
            assert!(matches!(outcome, RenderOutcome::Incompatible { .. }));
        }

        #[test]
        fn test_other_failure_is_terminal() {
            let outcome = classify_output(&output(1, "no such browser"), "Protocol error");
            assert!(matches!(outcome, RenderOutcome::Failed { .. }));
        }
    }
}
