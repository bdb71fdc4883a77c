use crate::command::{ChildHandle, ChildProcess, CommandFactory, Outcome};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::external::{ProcessSpawner, Spawner};
use crate::lexer;
use crate::parser::{self, SubCommand};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, IsTerminal, Write};

/// Printed before each line in interactive mode.
pub const PROMPT: &str = "wish> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and external commands.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```
/// use wish::Interpreter;
/// let mut sh = Interpreter::default();
/// assert!(!sh.execute_line("path /bin /usr/bin"));
/// assert!(sh.execute_line("true & exit"));
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
    spawner: Box<dyn Spawner>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
            spawner: Box::new(ProcessSpawner),
            stderr: Box::new(io::stderr()),
        }
    }

    /// Launch external commands through `spawner` instead of real processes.
    pub fn with_spawner(mut self, spawner: impl Spawner + 'static) -> Self {
        self.spawner = Box::new(spawner);
        self
    }

    /// Write error reports to `stderr` instead of the process's standard error.
    pub fn with_error_output(mut self, stderr: impl Write + 'static) -> Self {
        self.stderr = Box::new(stderr);
        self
    }

    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Run every sub-command of one line and wait for all children it launched.
    ///
    /// Sub-commands are dispatched left to right. Builtins run inline, external
    /// commands are launched without waiting, and a failing sub-command is
    /// reported and skipped without affecting its siblings. Only after the last
    /// dispatch are the children waited on.
    ///
    /// Returns `true` when `exit` was requested.
    pub fn execute_line(&mut self, line: &str) -> bool {
        let sub_commands = parser::parse_line(line);
        tracing::debug!(line, count = sub_commands.len(), "split line");

        let mut children = Vec::new();
        for parsed in sub_commands {
            match parsed.and_then(|command| self.dispatch(&command)) {
                Ok(Outcome::Spawned(child)) => children.push(child),
                Ok(Outcome::Finished) => {}
                Err(error) => error::report(&mut *self.stderr, &error),
            }
        }
        wait_all(children);
        self.env.should_exit
    }

    fn dispatch(&mut self, command: &SubCommand) -> Result<Outcome, ShellError> {
        tracing::debug!(name = %command.name, args = ?command.args, redirect = ?command.redirect, "dispatch");
        // Unreachable with the default factories, whose last one takes any name.
        let executable = self
            .commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, command))
            .ok_or_else(|| ShellError::CommandNotFound(command.name.clone()))?;
        executable.execute(&mut self.env, self.spawner.as_ref())
    }

    /// Trim one raw input line and execute it unless it is blank.
    fn run_line(&mut self, raw: &str) -> bool {
        let line = lexer::trim_line(raw);
        if line.is_empty() {
            return false;
        }
        self.execute_line(line)
    }

    /// Execute a script line by line until it ends or `exit` runs. No prompt is shown.
    pub fn run_script(&mut self, reader: impl BufRead) -> io::Result<()> {
        self.read_loop(reader, None)
    }

    /// Like [`Interpreter::run_script`], but writes [`PROMPT`] to `prompt` before every read.
    pub fn run_prompted(&mut self, reader: impl BufRead, mut prompt: impl Write) -> io::Result<()> {
        self.read_loop(reader, Some(&mut prompt))
    }

    fn read_loop(
        &mut self,
        mut reader: impl BufRead,
        mut prompt: Option<&mut dyn Write>,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            if let Some(out) = prompt.as_deref_mut() {
                out.write_all(PROMPT.as_bytes())?;
                out.flush()?;
            }
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            if self.run_line(&line) {
                break;
            }
        }
        Ok(())
    }

    /// Read-Eval-Print Loop, prompting with [`PROMPT`].
    ///
    /// Ends on end of input, on Ctrl-C, or once `exit` runs. Without a terminal
    /// on standard input, lines are read directly and the prompt goes to
    /// standard output.
    pub fn repl(&mut self) -> rustyline::Result<()> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Ok(self.run_prompted(stdin.lock(), io::stdout())?);
        }

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    if !lexer::trim_line(&line).is_empty() {
                        rl.add_history_entry(line.as_str())?;
                    }
                    if self.run_line(&line) {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }
}

/// Block until every child has terminated. Exit statuses are not inspected.
fn wait_all(children: Vec<ChildHandle>) {
    for child in children {
        let pid = child.id();
        match child.wait() {
            Ok(()) => tracing::trace!(pid, "child finished"),
            Err(error) => tracing::warn!(pid, %error, "waiting for child failed"),
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `cd`, `path`
    /// - external command launcher
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<SetPath>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ERROR_MESSAGE;
    use crate::external::SpawnRequest;
    use crate::io_adapters::MemWriter;
    use crate::path::SearchPath;
    use std::cell::{Cell, RefCell};
    use std::fs::{self, File};
    use std::os::unix::fs::PermissionsExt;
    use std::rc::Rc;
    use tempfile::TempDir;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct FakeChild {
        id: u32,
        log: Log,
    }

    impl ChildProcess for FakeChild {
        fn id(&self) -> u32 {
            self.id
        }

        fn wait(self: Box<Self>) -> io::Result<()> {
            self.log.borrow_mut().push(format!("wait {}", self.id));
            Ok(())
        }
    }

    /// Records launches and waits instead of creating processes.
    #[derive(Clone, Default)]
    struct FakeSpawner {
        log: Log,
        next_id: Rc<Cell<u32>>,
    }

    impl Spawner for FakeSpawner {
        fn spawn(&self, request: SpawnRequest) -> io::Result<ChildHandle> {
            if request.arg0 == "broken" {
                return Err(io::Error::other("exec format error"));
            }
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            self.log
                .borrow_mut()
                .push(format!("spawn {} {}", request.arg0, request.args.join(" ")).trim_end().to_owned());
            Ok(Box::new(FakeChild {
                id,
                log: self.log.clone(),
            }))
        }
    }

    struct Fixture {
        sh: Interpreter,
        log: Log,
        stderr: MemWriter,
        bin: TempDir,
    }

    impl Fixture {
        /// An interpreter whose search path holds executables `a`, `b`, `c` and `broken`.
        fn new() -> Self {
            let bin = TempDir::new().unwrap();
            for name in ["a", "b", "c", "broken"] {
                let path = bin.path().join(name);
                File::create(&path).unwrap();
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            }
            let spawner = FakeSpawner::default();
            let log = spawner.log.clone();
            let stderr = MemWriter::new();
            let env = Environment::with_search_path(SearchPath::from_dirs([bin
                .path()
                .to_string_lossy()
                .into_owned()]));
            let sh = Interpreter::default()
                .with_spawner(spawner)
                .with_error_output(stderr.clone())
                .with_environment(env);
            Self {
                sh,
                log,
                stderr,
                bin,
            }
        }

        fn events(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        fn errors(&self) -> usize {
            self.stderr.contents().matches(ERROR_MESSAGE).count()
        }
    }

    #[test]
    fn test_all_launches_happen_before_any_wait() {
        let mut f = Fixture::new();
        assert!(!f.sh.execute_line("a 1 & b & c x y"));
        assert_eq!(
            f.events(),
            [
                "spawn a 1",
                "spawn b",
                "spawn c x y",
                "wait 1",
                "wait 2",
                "wait 3"
            ]
        );
        assert_eq!(f.errors(), 0);
    }

    #[test]
    fn test_blank_and_separator_only_lines_are_no_ops() {
        let mut f = Fixture::new();
        assert!(!f.sh.execute_line(""));
        assert!(!f.sh.execute_line(" & && "));
        assert!(f.events().is_empty());
        assert_eq!(f.errors(), 0);
    }

    #[test]
    fn test_malformed_sub_commands_do_not_stop_siblings() {
        let mut f = Fixture::new();
        let out = f.bin.path().join("out");
        let line = format!(
            "a > x > y & b > {} & c > & a > p q & > lonely",
            out.display()
        );
        f.sh.execute_line(&line);
        assert_eq!(f.events(), ["spawn b", "wait 1"]);
        assert_eq!(f.errors(), 4);
        assert!(out.exists());
    }

    #[test]
    fn test_launch_failure_keeps_already_launched_children() {
        let mut f = Fixture::new();
        f.sh.execute_line("a & broken & missing & b");
        assert_eq!(f.events(), ["spawn a", "spawn b", "wait 1", "wait 2"]);
        assert_eq!(f.errors(), 2);
    }

    #[test]
    fn test_exit_waits_for_line_and_reports_termination() {
        let mut f = Fixture::new();
        assert!(f.sh.execute_line("a & exit & b"));
        assert_eq!(f.events(), ["spawn a", "spawn b", "wait 1", "wait 2"]);
        assert!(f.sh.env().should_exit);
    }

    #[test]
    fn test_exit_with_operand_does_not_terminate() {
        let mut f = Fixture::new();
        assert!(!f.sh.execute_line("exit now"));
        assert_eq!(f.errors(), 1);
        assert!(!f.sh.env().should_exit);
    }

    #[test]
    fn test_empty_path_disables_external_commands() {
        let mut f = Fixture::new();
        f.sh.execute_line("path");
        f.sh.execute_line("a");
        assert!(f.events().is_empty());
        assert_eq!(f.errors(), 1);

        let dir = f.bin.path().to_string_lossy().into_owned();
        f.sh.execute_line(&format!("path /nonexistent {dir}"));
        f.sh.execute_line("a");
        assert_eq!(f.events(), ["spawn a", "wait 1"]);
    }

    #[test]
    fn test_builtin_misuse_is_reported() {
        let mut f = Fixture::new();
        f.sh.execute_line("cd & cd a b");
        assert_eq!(f.errors(), 2);
        assert!(f.events().is_empty());
    }

    #[test]
    fn test_run_script_stops_after_exit_line() {
        let mut f = Fixture::new();
        let script = "a\n\n   \nb & exit\nc\n";
        f.sh.run_script(script.as_bytes()).unwrap();
        assert_eq!(f.events(), ["spawn a", "wait 1", "spawn b", "wait 2"]);
    }

    #[test]
    fn test_run_prompted_prompts_before_every_read() {
        let mut f = Fixture::new();
        let prompts = MemWriter::new();
        f.sh.run_prompted("a\n\nb\n".as_bytes(), prompts.clone()).unwrap();
        assert_eq!(prompts.contents(), PROMPT.repeat(4));
        assert_eq!(f.events(), ["spawn a", "wait 1", "spawn b", "wait 2"]);
    }

    #[test]
    fn test_run_prompted_stops_prompting_after_exit() {
        let mut f = Fixture::new();
        let prompts = MemWriter::new();
        f.sh.run_prompted("a\nexit\nb\n".as_bytes(), prompts.clone()).unwrap();
        assert_eq!(prompts.contents(), PROMPT.repeat(2));
        assert_eq!(f.events(), ["spawn a", "wait 1"]);
    }

    #[test]
    fn test_no_matching_factory_is_reported() {
        let stderr = MemWriter::new();
        let mut sh = Interpreter::new(Vec::new()).with_error_output(stderr.clone());
        assert!(!sh.execute_line("a & b"));
        assert_eq!(stderr.contents(), ERROR_MESSAGE.repeat(2));
    }

    #[test]
    fn test_run_script_runs_to_end_without_exit() {
        let mut f = Fixture::new();
        f.sh.run_script("a\r\nb".as_bytes()).unwrap();
        assert_eq!(f.events(), ["spawn a", "wait 1", "spawn b", "wait 2"]);
        assert!(!f.sh.env().should_exit);
    }
}
