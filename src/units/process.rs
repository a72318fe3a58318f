use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use super::{Unit, UnitName, UnitParams};
use crate::error::UnitError;

/// Environment variables a unit process may see. Everything else is stripped.
const SAFE_ENV_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "LANG",
    "LC_ALL",
    "TERM",
    "TZ",
    "DOCKER_HOST",
    "DOCKER_CONFIG",
];

/// How a unit name turns into an external command.
#[derive(Debug, Clone, PartialEq)]
pub enum Launcher {
    /// `docker run --rm -i <image_prefix>/<unit> [--sentences N]`
    Docker { image_prefix: String },
    /// `<program> unit <unit> [--sentences N]`, usually this very binary.
    Binary { program: PathBuf },
    /// `sh -c <command>` with `SLUICE_UNIT` / `SLUICE_SENTENCES` exported.
    Shell { command: String },
}

impl Launcher {
    /// Re-run the current executable in unit mode.
    pub fn current_exe() -> io::Result<Self> {
        Ok(Launcher::Binary {
            program: std::env::current_exe()?,
        })
    }

    /// Short label for logs and spawn errors.
    pub fn program(&self) -> String {
        match self {
            Launcher::Docker { .. } => "docker".to_string(),
            Launcher::Binary { program } => program.display().to_string(),
            Launcher::Shell { .. } => "sh".to_string(),
        }
    }

    fn command(&self, unit: UnitName, params: &UnitParams) -> Command {
        match self {
            Launcher::Docker { image_prefix } => {
                let mut cmd = sanitized("docker");
                cmd.args(["run", "--rm", "-i"])
                    .arg(format!("{}/{}", image_prefix, unit));
                if let Some(n) = params.sentences {
                    cmd.arg("--sentences").arg(n.to_string());
                }
                cmd
            }
            Launcher::Binary { program } => {
                let mut cmd = sanitized(program);
                cmd.arg("unit").arg(unit.as_str());
                if let Some(n) = params.sentences {
                    cmd.arg("--sentences").arg(n.to_string());
                }
                cmd
            }
            Launcher::Shell { command } => {
                let mut cmd = sanitized("sh");
                cmd.arg("-c").arg(command).env("SLUICE_UNIT", unit.as_str());
                if let Some(n) = params.sentences {
                    cmd.env("SLUICE_SENTENCES", n.to_string());
                }
                cmd
            }
        }
    }
}

/// A command that inherits nothing but the safe environment variables.
fn sanitized(program: impl AsRef<std::ffi::OsStr>) -> Command {
    let mut cmd = Command::new(program);
    cmd.env_clear().envs(filtered_env());
    cmd
}

fn filtered_env() -> Vec<(String, String)> {
    SAFE_ENV_VARS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|val| (key.to_string(), val)))
        .collect()
}

/// Runs one unit as a child process: payload on stdin, result on stdout.
pub struct ProcessUnit {
    name: UnitName,
    launcher: Launcher,
    max_output_bytes: usize,
}

impl ProcessUnit {
    pub fn new(name: UnitName, launcher: Launcher, max_output_bytes: usize) -> Self {
        Self {
            name,
            launcher,
            max_output_bytes,
        }
    }

    /// Shorten diagnostic text such as stderr. Never applied to unit output.
    fn truncate_output(output: &str, max_bytes: usize) -> String {
        if output.len() <= max_bytes {
            return output.to_string();
        }
        // Back off to the nearest char boundary
        let mut end = max_bytes;
        while !output.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}\n\n[truncated: showing {}/{} bytes]",
            &output[..end],
            end,
            output.len()
        )
    }
}

#[async_trait]
impl Unit for ProcessUnit {
    fn name(&self) -> UnitName {
        self.name
    }

    async fn process(&self, input: &str, params: &UnitParams) -> Result<String, UnitError> {
        let mut cmd = self.launcher.command(self.name, params);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(unit = %self.name, program = %self.launcher.program(), "spawning unit");

        let mut child = cmd.spawn().map_err(|source| UnitError::Spawn {
            program: self.launcher.program(),
            source,
        })?;

        let mut stdin = child.stdin.take();
        let payload = input.as_bytes();
        let feed = async move {
            if let Some(stdin) = stdin.as_mut() {
                stdin.write_all(payload).await?;
                stdin.shutdown().await?;
            }
            Ok::<(), io::Error>(())
        };

        let limit = self.max_output_bytes;
        let (fed, stdout, stderr) = tokio::join!(
            feed,
            read_capped(child.stdout.take(), limit),
            read_capped(child.stderr.take(), limit),
        );
        let stdout = stdout?;

        if stdout.len() > limit {
            if let Err(e) = child.kill().await {
                tracing::debug!(unit = %self.name, error = %e, "kill after overflow failed");
            }
            return Err(UnitError::OutputTooLarge { limit });
        }

        let status = child.wait().await?;
        if !status.success() {
            let stderr = stderr?;
            let stderr = String::from_utf8_lossy(&stderr);
            return Err(UnitError::Failed {
                code: status.code().unwrap_or(-1),
                stderr: Self::truncate_output(stderr.trim(), limit),
            });
        }

        // A unit may exit without reading all of its input; that's its call.
        if let Err(e) = fed
            && e.kind() != io::ErrorKind::BrokenPipe
        {
            return Err(UnitError::Io(e));
        }

        let mut stdout = String::from_utf8(stdout).map_err(|_| UnitError::InvalidUtf8)?;
        if stdout.ends_with('\n') {
            stdout.pop();
        }
        Ok(stdout)
    }
}

/// Read at most `limit + 1` bytes, so an overflow is visible without
/// buffering the whole stream.
async fn read_capped<R>(reader: Option<R>, limit: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(reader) = reader {
        reader
            .take(limit as u64 + 1)
            .read_to_end(&mut buf)
            .await?;
    }
    Ok(buf)
}
