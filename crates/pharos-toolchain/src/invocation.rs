use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use zeroize::Zeroizing;

#[derive(Clone)]
enum Arg {
    Plain(String),
    Secret(Zeroizing<String>),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(value) => value,
            Arg::Secret(value) => value,
        }
    }
}

/// One external command, its working directory and how to supervise it.
///
/// Secret arguments are passed to the child verbatim but render as
/// `<redacted>` everywhere the command line is displayed or logged.
#[derive(Clone)]
pub struct Invocation {
    program: String,
    args: Vec<Arg>,
    cwd: PathBuf,
    env: Vec<(String, String)>,
    timeout: Option<Duration>,
    progress: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
            timeout: None,
            progress: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args
            .extend(args.into_iter().map(|arg| Arg::Plain(arg.into())));
        self
    }

    pub fn secret_arg(mut self, secret: Zeroizing<String>) -> Self {
        self.args.push(Arg::Secret(secret));
        self
    }

    /// Set an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Terminate the child if it is still running after `limit`.
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Emit a liveness tick while waiting for the child.
    pub fn with_progress(mut self) -> Self {
        self.progress = true;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn env_vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.env.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn timeout_limit(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn shows_progress(&self) -> bool {
        self.progress
    }

    /// Real argument values, secrets included
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(Arg::value)
    }

    /// Redacted command line for display and logs
    pub fn command_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            match arg {
                Arg::Plain(value) => write!(f, " {}", value)?,
                Arg::Secret(_) => f.write_str(" <redacted>")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("command", &self.to_string())
            .field("cwd", &self.cwd)
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .field("progress", &self.progress)
            .finish()
    }
}
