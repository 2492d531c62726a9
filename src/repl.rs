// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Interactive session loop.
//!
//! Reads one line at a time, hands it to the agent, and prints the reply.
//! A failed turn is reported and the loop keeps going; only an exit keyword,
//! end of input, or an unreadable input stream ends the session.

use std::future::Future;
use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

use crate::agent::Agent;
use crate::mcp::ToolBackend;

/// Line printed when the session starts.
pub const BANNER: &str = "Type 'exit' or 'quit' to stop.";

/// Prompt printed before each read.
pub const USER_PROMPT: &str = "You: ";

/// Words that end the session (case-insensitive).
pub const EXIT_KEYWORDS: &[&str] = &["exit", "quit"];

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The user typed an exit keyword.
    Command,
    /// The input stream ended.
    EndOfInput,
    /// The input stream could not be read.
    InputError,
}

/// Counts for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub failed_turns: usize,
    pub exit_reason: ExitReason,
}

/// Check whether a line is an exit keyword.
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    EXIT_KEYWORDS.iter().any(|k| line.eq_ignore_ascii_case(k))
}

/// Run the read-dispatch-print loop until the user exits or input ends.
///
/// Tool discovery must already have run on `tools`. Only failures to write
/// to `output` are returned as errors.
pub async fn run_session<R, W>(
    agent: &Agent,
    tools: &dyn ToolBackend,
    mut input: R,
    output: &mut W,
) -> std::io::Result<SessionSummary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut turns = 0;
    let mut failed_turns = 0;
    let mut line = String::new();

    writeln!(output, "{}", BANNER)?;

    let exit_reason = loop {
        write!(output, "{}", USER_PROMPT)?;
        output.flush()?;

        line.clear();
        match input.read_line(&mut line).await {
            Ok(0) => {
                writeln!(output)?;
                break ExitReason::EndOfInput;
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "Failed to read input");
                writeln!(output)?;
                break ExitReason::InputError;
            }
        }

        let text = line.trim_end_matches(['\r', '\n']);
        if is_exit_command(text) {
            break ExitReason::Command;
        }

        turns += 1;
        match agent.handle_turn(tools, text).await {
            Ok(outcome) => {
                writeln!(output, "Assistant: {}", outcome.reply)?;
            }
            Err(e) => {
                failed_turns += 1;
                error!(error = %e, "Turn failed");
                writeln!(output, "{} {}", "Error:".red(), e)?;
            }
        }
    };

    info!(turns, failed_turns, reason = ?exit_reason, "Session ended");

    Ok(SessionSummary {
        turns,
        failed_turns,
        exit_reason,
    })
}

/// Drive `session` until it finishes or `interrupt` resolves.
///
/// Returns `None` when interrupted. The session future is dropped before
/// this returns, so a tool server spawned by an in-flight turn is killed.
pub async fn run_until_interrupted<S, I>(
    session: S,
    interrupt: I,
) -> std::io::Result<Option<SessionSummary>>
where
    S: Future<Output = std::io::Result<SessionSummary>>,
    I: Future,
{
    tokio::select! {
        result = session => result.map(Some),
        _ = interrupt => Ok(None),
    }
}
