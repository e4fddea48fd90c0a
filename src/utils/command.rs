//! 子进程执行：带超时，超时即 kill 整个进程组
//! stdout/stderr 由后台线程读取，避免管道写满导致子进程阻塞；
//! 读取同样受截止时间约束，后台孙进程占住管道时不会无限等待

use crate::utils::{ReadyError, Result};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

pub fn run(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> Result<CommandOutput> {
    tracing::debug!(program, ?args, cwd = %cwd.display(), "spawning");
    let deadline = Instant::now() + timeout;

    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ReadyError::ToolMissing(program.to_string()),
        _ => ReadyError::Command(format!("spawn `{}` failed: {}", program, e)),
    })?;

    let (tx, rx) = mpsc::channel();
    spawn_reader(child.stdout.take(), Stream::Stdout, tx.clone());
    spawn_reader(child.stderr.take(), Stream::Stderr, tx);

    let status = wait_until(&mut child, program, timeout, deadline)?;

    let mut stdout = String::new();
    let mut stderr = String::new();
    for _ in 0..2 {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok((Stream::Stdout, text)) => stdout = text,
            Ok((Stream::Stderr, text)) => stderr = text,
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // 直接子进程已退出，但后台进程仍持有管道
                kill_tree(&mut child);
                return Err(timed_out(program, timeout));
            }
        }
    }

    Ok(CommandOutput { status, stdout, stderr })
}

/// `true` only when the program ran to completion with a zero exit code.
pub fn succeeds(program: &str, args: &[&str], cwd: &Path, timeout: Duration) -> bool {
    match run(program, args, cwd, timeout) {
        Ok(out) => out.success(),
        Err(e) => {
            tracing::debug!("{} {:?}: {}", program, args, e);
            false
        }
    }
}

fn wait_until(child: &mut Child, program: &str, timeout: Duration, deadline: Instant) -> Result<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_tree(child);
                    let _ = child.wait();
                    return Err(timed_out(program, timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(ReadyError::Command(format!("wait for `{}` failed: {}", program, e)))
            }
        }
    }
}

/// Kills the child's whole process group so build tools' workers die with it.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Ok(pid) = i32::try_from(child.id()) {
        if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
            tracing::debug!("killpg {}: {}", pid, e);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn timed_out(program: &str, timeout: Duration) -> ReadyError {
    ReadyError::Timeout {
        program: program.to_string(),
        secs: timeout.as_secs(),
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>, stream: Stream, tx: mpsc::Sender<(Stream, String)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut p) = pipe {
            let _ = p.read_to_end(&mut buf);
        }
        let _ = tx.send((stream, String::from_utf8_lossy(&buf).into_owned()));
    });
}
