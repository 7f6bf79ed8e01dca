// src/ui/picker.rs
use super::UI_LOG_TARGET;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Presents a list of strings and returns the user's choice.
#[async_trait]
pub trait Picker: Send + Sync {
    /// `None` when the user cancelled or typed nothing.
    async fn pick(&self, prompt: &str, entries: &[String], message: Option<&str>) -> Option<String>;
}

/// `rofi -dmenu` picker. Free text typed into the prompt is returned as is.
pub struct RofiPicker {
    program: String,
}

impl Default for RofiPicker {
    fn default() -> Self {
        RofiPicker { program: "rofi".to_string() }
    }
}

impl RofiPicker {
    pub fn with_program(program: impl Into<String>) -> Self {
        RofiPicker { program: program.into() }
    }

    pub fn args(prompt: &str, message: Option<&str>) -> Vec<String> {
        let mut args = vec!["-dmenu".to_string(), "-i".to_string(), "-p".to_string(), prompt.to_string()];
        if let Some(message) = message {
            args.push("-mesg".to_string());
            args.push(message.to_string());
        }
        args
    }
}

#[async_trait]
impl Picker for RofiPicker {
    async fn pick(&self, prompt: &str, entries: &[String], message: Option<&str>) -> Option<String> {
        let mut child = match tokio::process::Command::new(&self.program)
            .args(Self::args(prompt, message))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(target: UI_LOG_TARGET, "Could not start {}: {}", self.program, e);
                return None;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            let input = entries.join("\n");
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(target: UI_LOG_TARGET, "Picker closed its input early: {}", e);
            }
            // stdin dropped here so the picker sees EOF
        }

        let output = match child.wait_with_output().await {
            Ok(output) => output,
            Err(e) => {
                warn!(target: UI_LOG_TARGET, "Picker failed: {}", e);
                return None;
            }
        };
        let choice = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if choice.is_empty() {
            None
        } else {
            Some(choice)
        }
    }
}
