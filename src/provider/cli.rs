//! Shell command execution for provider lookups.

use crate::config::MAX_CLI_OUTPUT;
use crate::error::{TopologyError, TopologyResult};
use colored::Colorize;
use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;

/// Splits a command line on spaces while keeping quoted substrings whole.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> TopologyResult<&'static Regex> {
    if let Some(re) = COMMAND_REGEX.get() {
        return Ok(re);
    }
    let re = Regex::new(r#"'([^']*)'\s*|"([^"]*)"\s*|([^'\s]+)\s*"#)
        .map_err(|e| TopologyError::ZoneLookup(format!("invalid command regex: {e}")))?;
    Ok(COMMAND_REGEX.get_or_init(|| re))
}

/// Run a command line and return its stdout.
///
/// Fails when the program cannot be started, exits non-zero, prints more than
/// [`MAX_CLI_OUTPUT`] bytes, or prints invalid UTF-8.
pub fn run(cmd: &str) -> TopologyResult<String> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let args = split_and_strip(cmd)?;
    log::trace!("split args={:?}", args);
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| TopologyError::ZoneLookup("empty command".to_string()))?;

    let output = Command::new(program).args(rest).output().map_err(|e| {
        log::error!("Command execution failed: {e}");
        TopologyError::ZoneLookup(format!("failed to execute '{program}': {e}"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(TopologyError::ZoneLookup(format!(
            "'{program}' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    log::debug!("Success cmd: {cmd} stdout.len()={}", output.stdout.len());
    if output.stdout.len() > MAX_CLI_OUTPUT {
        return Err(TopologyError::ZoneLookup(format!(
            "response too large: {} bytes from '{program}'",
            output.stdout.len()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| TopologyError::ZoneLookup(format!("invalid UTF-8 from '{program}': {e}")))
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> TopologyResult<Vec<&str>> {
    Ok(get_command_regex()?
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect())
}
