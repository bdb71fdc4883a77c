use crate::command::{ChildHandle, CommandFactory, ExecutableCommand, Outcome};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::interpreter::Factory;
use crate::parser::SubCommand;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Everything needed to start one child process.
#[derive(Debug)]
pub struct SpawnRequest {
    /// Resolved executable.
    pub program: PathBuf,
    /// `argv[0]` as the user typed it.
    pub arg0: String,
    pub args: Vec<String>,
    /// Already opened file for both standard output and standard error.
    pub redirect: Option<File>,
}

/// Capability to launch a child process without waiting for it.
pub trait Spawner {
    fn spawn(&self, request: SpawnRequest) -> io::Result<ChildHandle>;
}

/// [`Spawner`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&self, request: SpawnRequest) -> io::Result<ChildHandle> {
        let mut command = Command::new(&request.program);
        command.arg0(&request.arg0).args(&request.args);
        if let Some(file) = request.redirect {
            // Both streams share one open file description, as with dup2.
            command
                .stdout(Stdio::from(file.try_clone()?))
                .stderr(Stdio::from(file));
        }
        let child = command.spawn()?;
        tracing::debug!(pid = child.id(), program = %request.program.display(), "spawned");
        Ok(Box::new(child))
    }
}

/// Command that is not a builtin.
#[derive(Debug)]
pub struct ExternalCommand {
    name: String,
    args: Vec<String>,
    redirect: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(name: String, args: Vec<String>, redirect: Option<PathBuf>) -> Self {
        Self {
            name,
            args,
            redirect,
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        _env: &Environment,
        command: &SubCommand,
    ) -> Option<Box<dyn ExecutableCommand>> {
        Some(Box::new(ExternalCommand::new(
            command.name.clone(),
            command.args.clone(),
            command.redirect.clone(),
        )))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Launch the command and return at once.
    ///
    /// The redirection target is opened (and truncated) first. Each executable
    /// candidate on the search path is tried in order until one launches. When
    /// none does, the failure goes where the child's standard error would have
    /// gone: into the redirection file if there is one, otherwise back to the
    /// caller as an error.
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        spawner: &dyn Spawner,
    ) -> Result<Outcome, ShellError> {
        let Self {
            name,
            args,
            redirect,
        } = *self;
        if env.search_path.is_empty() {
            return Err(ShellError::EmptySearchPath);
        }
        let output = redirect
            .as_deref()
            .map(|target| open_redirect(target).map(|file| (target, file)))
            .transpose()?;

        let mut failure = None;
        for program in env.search_path.candidates(&name) {
            let redirect = match &output {
                Some((target, file)) => Some(clone_redirect(target, file)?),
                None => None,
            };
            let request = SpawnRequest {
                program,
                arg0: name.clone(),
                args: args.clone(),
                redirect,
            };
            match spawner.spawn(request) {
                Ok(child) => return Ok(Outcome::Spawned(child)),
                Err(source) => {
                    tracing::debug!(%source, "launch failed, trying next directory");
                    failure = Some(source);
                }
            }
        }

        let reason = match failure {
            Some(source) => ShellError::Spawn { name, source },
            None => ShellError::CommandNotFound(name),
        };
        match output {
            Some((_, mut file)) => {
                error::report(&mut file, &reason);
                Ok(Outcome::Finished)
            }
            None => Err(reason),
        }
    }
}

fn clone_redirect(target: &Path, file: &File) -> Result<File, ShellError> {
    file.try_clone().map_err(|source| ShellError::Redirect {
        path: target.to_owned(),
        source,
    })
}

/// Open a redirection target for writing, creating or truncating it.
fn open_redirect(path: &Path) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o666)
        .open(path)
        .map_err(|source| ShellError::Redirect {
            path: path.to_owned(),
            source,
        })
}
