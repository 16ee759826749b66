//! Execution of the build command: output capture in its two presentation
//! modes, and the single remove-and-retry pass over a corrupted Swift
//! packages cache

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use chrono::Local;
use color_eyre::{
    eyre::{eyre, Context},
    Result,
};

use crate::cache;
use crate::cli::input::LogFormatter;

use super::command::BuildCommand;

/// Runs the build, returning the full captured combined output next to the
/// outcome. The output comes back even on failure so callers can echo its
/// tail and persist it as the build log
pub fn run(build_cmd: &BuildCommand, formatter: LogFormatter) -> (String, Result<()>) {
    log_with_timestamp(&build_cmd.printable());

    match formatter {
        LogFormatter::Xcpretty => run_through_xcpretty(build_cmd),
        LogFormatter::Xcodebuild => run_passthrough(build_cmd),
    }
}

/// Runs the build with the corrupted-package-cache recovery: when the run
/// fails, a cache directory is known and the captured output carries the
/// invalid-state marker, the cache is deleted and the exact same command
/// runs once more. The retry goes through the plain [`run`], so a second
/// marked failure is surfaced, never retried again
pub fn run_with_retry(
    build_cmd: &BuildCommand,
    formatter: LogFormatter,
    swift_packages_dir: Option<&Path>,
) -> (String, Result<()>) {
    run_with_retry_impl(build_cmd, swift_packages_dir, |cmd| run(cmd, formatter))
}

fn run_with_retry_impl<F>(
    build_cmd: &BuildCommand,
    swift_packages_dir: Option<&Path>,
    mut exec: F,
) -> (String, Result<()>)
where
    F: FnMut(&BuildCommand) -> (String, Result<()>),
{
    let (output, result) = exec(build_cmd);
    if result.is_ok() {
        return (output, result);
    }

    let Some(cache_dir) = swift_packages_dir else {
        return (output, result);
    };
    if !cache::is_cache_invalidated(&output) {
        return (output, result);
    }

    log::warn!(
        "Build failed and the Swift packages cache is in an invalid state, \
         removing it and retrying the build once"
    );
    if let Err(remove_err) = cache::remove(cache_dir) {
        return (output, Err(remove_err));
    }

    exec(build_cmd)
}

/// Streams the build output to the parent's stdout/stderr while keeping an
/// independent combined copy
fn run_passthrough(build_cmd: &BuildCommand) -> (String, Result<()>) {
    capture_build(build_cmd, |line| println!("{line}"), |line| eprintln!("{line}"))
}

/// Feeds the raw combined output through an `xcpretty` filter process,
/// which prints the pretty summary itself; the raw copy is what we return.
/// When the filter can't even be spawned the run degrades to passthrough
fn run_through_xcpretty(build_cmd: &BuildCommand) -> (String, Result<()>) {
    let pretty = Command::new("xcpretty").stdin(Stdio::piped()).spawn();
    let mut pretty = match pretty {
        Ok(child) => child,
        Err(spawn_err) => {
            log::warn!("Could not spawn xcpretty ({spawn_err}), switching to the raw output");
            return run_passthrough(build_cmd);
        }
    };

    // Both capture callbacks feed the same filter stdin, one of them from
    // the stderr drain thread
    let pretty_stdin = Mutex::new(pretty.stdin.take());
    let feed = |line: &str| {
        if let Ok(mut guard) = pretty_stdin.lock() {
            if let Some(stdin) = guard.as_mut() {
                let _ = writeln!(stdin, "{line}");
            }
        }
    };

    let (output, result) = capture_build(build_cmd, |line| feed(line), |line| feed(line));

    drop(pretty_stdin);
    if let Err(wait_err) = pretty.wait() {
        log::warn!("Failed to wait for the xcpretty filter: {wait_err}");
    }

    (output, result)
}

/// Spawns the build command with both streams piped, forwarding every
/// stdout line to `on_stdout` and every stderr line to `on_stderr` while
/// accumulating the combined output
fn capture_build(
    build_cmd: &BuildCommand,
    mut on_stdout: impl FnMut(&str),
    on_stderr: impl FnMut(&str) + Send,
) -> (String, Result<()>) {
    let mut captured = String::new();

    let spawned = build_cmd
        .command()
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| "Could not spawn the xcodebuild process");
    let mut child = match spawned {
        Ok(child) => child,
        Err(spawn_err) => return (captured, Err(spawn_err)),
    };

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stderr_captured = std::thread::scope(|scope| {
        let stderr_handle = stderr.map(|stderr| {
            scope.spawn(move || {
                let mut on_stderr = on_stderr;
                let mut buffer = String::new();
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    on_stderr(&line);
                    buffer.push_str(&line);
                    buffer.push('\n');
                }
                buffer
            })
        });

        if let Some(stdout) = stdout {
            for line in BufReader::new(stdout).lines().map_while(Result::ok) {
                on_stdout(&line);
                captured.push_str(&line);
                captured.push('\n');
            }
        }

        stderr_handle
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default()
    });
    captured.push_str(&stderr_captured);

    let result = match child.wait() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => Err(eyre!("xcodebuild exited with {status}")),
        Err(wait_err) => Err(wait_err).with_context(|| "Could not wait for the xcodebuild process"),
    };

    (captured, result)
}

fn log_with_timestamp(message: &str) {
    println!("[{}] $ {}", Local::now().format("%H:%M:%S"), message);
}
