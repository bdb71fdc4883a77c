use crate::command::{CommandFactory, ExecutableCommand, Outcome};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::Spawner;
use crate::interpreter::Factory;
use crate::parser::SubCommand;
use argh::{EarlyExit, FromArgs};
use std::env;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process. Operands are never taken as flags,
/// so argh only checks how many there are. Any redirection on a builtin is ignored.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, matched case-sensitively.
    fn name() -> &'static str;

    /// Executes the command against the interpreter state.
    fn execute(self, env: &mut Environment) -> Result<(), ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        env: &mut Environment,
        _spawner: &dyn Spawner,
    ) -> Result<Outcome, ShellError> {
        <T as BuiltinCommand>::execute(*self, env)?;
        Ok(Outcome::Finished)
    }
}

/// A builtin invoked with the wrong number of operands.
struct InvalidArgs {
    name: &'static str,
    output: String,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _env: &mut Environment,
        _spawner: &dyn Spawner,
    ) -> Result<Outcome, ShellError> {
        Err(ShellError::BuiltinUsage {
            name: self.name,
            message: self.output.trim().to_owned(),
        })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        command: &SubCommand,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if command.name != T::name() {
            return None;
        }
        // Operands are raw words: a leading `--` stops argh from reading any of
        // them as flags, `--` and `help` included.
        let args: Vec<&str> = std::iter::once("--")
            .chain(command.args.iter().map(String::as_str))
            .collect();
        Some(match T::from_args(&[T::name()], &args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, .. }) => Box::new(InvalidArgs {
                name: T::name(),
                output,
            }),
        })
    }
}

#[derive(FromArgs)]
/// Finish the current line, wait for its children, then leave the shell.
pub struct Exit {}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, env: &mut Environment) -> Result<(), ShellError> {
        tracing::debug!("exit requested");
        env.should_exit = true;
        Ok(())
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, _env: &mut Environment) -> Result<(), ShellError> {
        let target = PathBuf::from(self.target);
        env::set_current_dir(&target).map_err(|source| ShellError::ChangeDirectory {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(dir = %target.display(), "changed directory");
        Ok(())
    }
}

#[derive(FromArgs)]
/// Replace the directories searched for external commands.
/// With no operands, external commands are disabled.
pub struct SetPath {
    #[argh(positional, greedy)]
    /// directories to search, highest priority first.
    pub dirs: Vec<String>,
}

impl BuiltinCommand for SetPath {
    fn name() -> &'static str {
        "path"
    }

    fn execute(self, env: &mut Environment) -> Result<(), ShellError> {
        env.search_path.set(self.dirs);
        Ok(())
    }
}
