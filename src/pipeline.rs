//! Sequential pipeline execution through two scratch files.
//!
//! Stages never run concurrently. Each stage reads the input scratch, writes
//! the output scratch, and after it exits the output is relayed back into the
//! input scratch for the next stage. The last stage's output is then copied
//! to the interpreter's output stream and both files are left empty.
//!
//! The scratch files carry fixed names in the current working directory and
//! will clobber user files of the same name.

use crate::env::Environment;
use crate::launcher;
use crate::tokens;
use anyhow::{Context, Result, bail};
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, Write};
use std::process::Stdio;

/// Relay file each stage reads from.
pub const INPUT_SCRATCH: &str = ".input";

/// Relay file each stage writes to.
pub const OUTPUT_SCRATCH: &str = ".output";

/// Execute a tokenized line containing at least one `"|"`. The final output
/// of the last stage is written to `output`; a stage that fails to resolve
/// reports `<name>: command not found` there and abandons the rest of the
/// line. Either way both scratch files end up truncated.
pub fn run(env: &Environment, line: &[String], output: &mut dyn Write) -> Result<()> {
    let stages = split_stages(line)?;

    let input_scratch = open_scratch(env, INPUT_SCRATCH)?;
    let output_scratch = open_scratch(env, OUTPUT_SCRATCH)?;

    let result = relay(env, &stages, &input_scratch, &output_scratch, output);

    // Scratch hygiene holds on every exit path, including errors.
    let _ = input_scratch.set_len(0);
    let _ = output_scratch.set_len(0);
    result
}

/// Split on the pipe token. Every stage must be non-empty: a leading,
/// trailing or doubled pipe is a syntax error.
fn split_stages(line: &[String]) -> Result<Vec<&[String]>> {
    let stages: Vec<&[String]> = line.split(|t| t == tokens::PIPE).collect();
    if stages.iter().any(|stage| stage.is_empty()) {
        bail!("syntax error: empty pipeline stage");
    }
    Ok(stages)
}

fn open_scratch(env: &Environment, name: &str) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(env.current_dir.join(name))
        .with_context(|| format!("cannot open scratch file {}", name))
}

fn relay(
    env: &Environment,
    stages: &[&[String]],
    input_scratch: &File,
    output_scratch: &File,
    output: &mut dyn Write,
) -> Result<()> {
    // The children duplicate these descriptors, so the file offsets are
    // shared with the parent's handles and must be repositioned before every
    // reuse.
    let mut input = input_scratch.try_clone().context("scratch handle")?;
    let mut out = output_scratch.try_clone().context("scratch handle")?;

    for (index, stage) in stages.iter().enumerate() {
        let name = &stage[0];
        let Some(program) = launcher::resolve(env, name) else {
            writeln!(output, "{}: command not found", name)?;
            return Ok(());
        };

        input.rewind()?;
        let status = launcher::launch(
            env,
            &program,
            &stage[1..],
            Stdio::from(input.try_clone()?),
            Stdio::from(out.try_clone()?),
        )?;
        log::debug!("pipeline stage {} ({}) exited with {}", index, name, status);

        // The just-produced output becomes the next stage's input.
        input.set_len(0)?;
        input.rewind()?;
        out.rewind()?;
        let relayed = io::copy(&mut out, &mut input)?;
        out.set_len(0)?;
        out.rewind()?;
        log::debug!("pipeline stage {} relayed {} bytes", index, relayed);
    }

    // The last relay moved the final stage's output into the input scratch.
    input.rewind()?;
    io::copy(&mut input, output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn toks(line: &str) -> Vec<String> {
        crate::tokens::split(line)
    }

    fn env_in_temp_dir(tag: &str) -> (Environment, PathBuf) {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        dir.push(format!(
            "relsh_test_pipeline_{}_{}_{}",
            tag,
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        let mut env = Environment::new();
        env.current_dir = dir.clone();
        (env, dir)
    }

    fn scratch_len(dir: &PathBuf, name: &str) -> u64 {
        fs::metadata(dir.join(name)).map(|m| m.len()).unwrap_or(0)
    }

    #[test]
    fn split_stages_accepts_simple_pipeline() {
        let line = toks("echo abc | tr a-z A-Z");
        let stages = split_stages(&line).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0], ["echo", "abc"]);
        assert_eq!(stages[1], ["tr", "a-z", "A-Z"]);
    }

    #[test]
    fn split_stages_rejects_empty_stages() {
        assert!(split_stages(&toks("a | | b")).is_err());
        assert!(split_stages(&toks("| a")).is_err());
        assert!(split_stages(&toks("a |")).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn two_stage_pipeline_produces_final_output() {
        let (env, dir) = env_in_temp_dir("two");

        let mut out = Vec::new();
        run(&env, &toks("echo abc | tr a-z A-Z"), &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "ABC\n");
        assert_eq!(scratch_len(&dir, INPUT_SCRATCH), 0);
        assert_eq!(scratch_len(&dir, OUTPUT_SCRATCH), 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn three_stage_pipeline_relays_through_middle_stage() {
        let (env, dir) = env_in_temp_dir("three");

        let mut out = Vec::new();
        run(&env, &toks("echo one two | cat | wc -w"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim(), "2");
        assert_eq!(scratch_len(&dir, INPUT_SCRATCH), 0);
        assert_eq!(scratch_len(&dir, OUTPUT_SCRATCH), 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn unresolved_stage_abandons_line_and_truncates() {
        let (env, dir) = env_in_temp_dir("missing");

        let mut out = Vec::new();
        run(
            &env,
            &toks("echo abc | definitely_not_a_command_relsh"),
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "definitely_not_a_command_relsh: command not found\n"
        );
        assert_eq!(scratch_len(&dir, INPUT_SCRATCH), 0);
        assert_eq!(scratch_len(&dir, OUTPUT_SCRATCH), 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn first_stage_reads_no_input() {
        let (env, dir) = env_in_temp_dir("noinput");

        // wc -c must see an empty stream, not the shell's own stdin.
        let mut out = Vec::new();
        run(&env, &toks("wc -c | cat"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "0");

        let _ = fs::remove_dir_all(&dir);
    }
}
