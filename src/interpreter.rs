//! The read-eval loop and per-line dispatch.

use crate::builtin::Builtin;
use crate::env::Environment;
use crate::launcher;
use crate::pipeline;
use crate::redirect::{self, RedirectKind, Redirection};
use crate::session::Session;
use crate::tokens;
use anyhow::{Result, bail};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Write};
use std::process::Stdio;

/// The interpreter: a [`Session`] acquired at startup and the mutable
/// [`Environment`] every command sees.
///
/// [`Shell::execute_line`] evaluates one already-read line against a
/// caller-supplied output stream; per-line errors are written there and never
/// escape. [`Shell::repl`] wraps it in the prompt loop against standard
/// output.
///
/// Example
/// ```no_run
/// use relsh::{Session, Shell};
/// let mut shell = Shell::new(Session::initialize().unwrap());
/// let mut out = Vec::new();
/// shell.execute_line("pwd", &mut out).unwrap();
/// ```
pub struct Shell {
    session: Session,
    env: Environment,
}

impl Shell {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            env: Environment::new(),
        }
    }

    /// Read lines until end-of-input or `exit`, printing the `"<n>: "` prompt
    /// when interactive. Every processed line, blank and failed ones
    /// included, increments the counter exactly once. The saved terminal mode
    /// is restored on the way out.
    pub fn repl(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        let result = self.read_loop(&mut editor);
        self.session.restore();
        result
    }

    fn read_loop(&mut self, editor: &mut DefaultEditor) -> Result<()> {
        let mut line_num: u64 = 0;
        loop {
            let prompt = if self.session.is_interactive() {
                format!("{}: ", line_num)
            } else {
                String::new()
            };
            match editor.readline(&prompt) {
                Ok(line) => {
                    let mut stdout = io::stdout().lock();
                    self.execute_line(&line, &mut stdout)?;
                    stdout.flush()?;
                    line_num += 1;
                    if self.env.should_exit {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(()),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Evaluate one line. All per-command errors — syntax, built-in failures,
    /// unresolvable names, I/O — are written to `output` and the returned
    /// `Err` is reserved for failures of `output` itself, so the caller's
    /// loop always survives to the next line.
    pub fn execute_line(&mut self, line: &str, output: &mut dyn Write) -> Result<()> {
        let line_tokens = tokens::split(line);
        if line_tokens.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.eval(&line_tokens, output) {
            writeln!(output, "{:#}", err)?;
        }
        Ok(())
    }

    fn eval(&mut self, line_tokens: &[String], output: &mut dyn Write) -> Result<()> {
        if let Some(builtin) = Builtin::lookup(&line_tokens[0]) {
            let args: Vec<&str> = line_tokens[1..].iter().map(String::as_str).collect();
            return builtin.execute(&args, output, &mut self.env);
        }

        let has_pipe = line_tokens.iter().any(|t| t == tokens::PIPE);
        let has_redirect = line_tokens
            .iter()
            .any(|t| t == tokens::REDIRECT_INPUT || t == tokens::REDIRECT_OUTPUT);

        if has_pipe && has_redirect {
            bail!("syntax error: redirection inside a pipeline is not supported");
        }
        if has_pipe {
            return pipeline::run(&self.env, line_tokens, output);
        }
        if has_redirect {
            let (command, redirection) = redirect::split(line_tokens)?;
            return self.run_external(command, Some(redirection), output);
        }
        self.run_external(line_tokens, None, output)
    }

    /// Launch a single external command, optionally with one stream rebound
    /// to a file. The interpreter's own streams are never rebound; the other
    /// stream stays inherited.
    fn run_external(
        &mut self,
        command: &[String],
        redirection: Option<Redirection>,
        output: &mut dyn Write,
    ) -> Result<()> {
        let name = &command[0];
        let Some(program) = launcher::resolve(&self.env, name) else {
            writeln!(output, "{}: command not found", name)?;
            return Ok(());
        };

        let (stdin, stdout) = match &redirection {
            None => (Stdio::inherit(), Stdio::inherit()),
            Some(r) => {
                let file = r.open(&self.env)?;
                match r.kind {
                    RedirectKind::Output => (Stdio::inherit(), Stdio::from(file)),
                    RedirectKind::Input => (Stdio::from(file), Stdio::inherit()),
                }
            }
        };

        launcher::launch(&self.env, &program, &command[1..], stdin, stdout)?;
        Ok(())
    }
}
