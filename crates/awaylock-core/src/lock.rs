//! The lock-action capability.
//!
//! The default implementation runs a platform command that sleeps the
//! display or locks the session.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

/// How long a lock command may run before it is abandoned.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the lock action.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// No program configured.
    #[error("lock command is empty")]
    EmptyCommand,

    /// The program could not be started.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The program ran but reported failure.
    #[error("`{program}` exited with {status}")]
    CommandFailed {
        /// Program name.
        program: String,
        /// Exit status description.
        status: String,
    },

    /// The program did not finish in time.
    #[error("`{program}` did not finish within {secs} seconds")]
    Timeout {
        /// Program name.
        program: String,
        /// Allowed time.
        secs: u64,
    },
}

/// Something that secures the workstation.
///
/// Must return (or fail) within a bounded time.
#[allow(async_fn_in_trait)]
pub trait LockAction {
    /// Lock now.
    async fn lock(&self) -> Result<(), LockError>;
}

impl<T: LockAction + ?Sized> LockAction for &T {
    async fn lock(&self) -> Result<(), LockError> {
        (**self).lock().await
    }
}

/// The platform's lock command.
#[must_use]
pub fn default_lock_command() -> Vec<String> {
    let argv: &[&str] = if cfg!(target_os = "macos") {
        &["pmset", "displaysleepnow"]
    } else if cfg!(target_os = "windows") {
        &["rundll32.exe", "user32.dll,LockWorkStation"]
    } else {
        &["loginctl", "lock-session"]
    };
    argv.iter().map(ToString::to_string).collect()
}

/// Locks by running an external program.
#[derive(Debug, Clone)]
pub struct CommandLock {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandLock {
    /// Build from an argv vector (`["pmset", "displaysleepnow"]`).
    ///
    /// # Errors
    ///
    /// Returns [`LockError::EmptyCommand`] if `argv` has no program.
    pub fn from_argv(argv: &[String]) -> Result<Self, LockError> {
        let (program, args) = argv.split_first().ok_or(LockError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(LockError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Override the completion timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program this lock runs.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl LockAction for CommandLock {
    async fn lock(&self) -> Result<(), LockError> {
        tracing::debug!(program = %self.program, args = ?self.args, "Running lock command");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LockError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| LockError::Timeout {
                program: self.program.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| LockError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(LockError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}
