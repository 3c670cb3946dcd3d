use super::{Engine, ENV_USER_INPUT};
use crate::stage::StageId;
use anyhow::{bail, Context};
use parking_lot::Mutex;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Engine living in an external executable.
///
/// Each call spawns `<program> [args..] <export-name>`, writes the input to stdin and
/// takes stdout as the stage output. The last user input is exported to the
/// child as `STAGEBENCH_USER_INPUT`.
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<String>,
    user_input: Mutex<String>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            user_input: Mutex::new(String::new()),
        }
    }

    /// Leading arguments placed before the export name, e.g. a script path
    /// when `program` is an interpreter
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Check the executable exists before handing out an engine
    pub async fn load(program: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let program = program.into();
        let metadata = tokio::fs::metadata(&program)
            .await
            .with_context(|| format!("engine program {} not found", program.display()))?;
        if !metadata.is_file() {
            bail!("engine program {} is not a file", program.display());
        }
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, export: &str, input: &str) -> std::io::Result<String> {
        let user_input = self.user_input.lock().clone();
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(export)
            .env(ENV_USER_INPUT, user_input)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from a separate thread so a chatty engine cannot block on
        // a full stdout pipe while we are still writing
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::Other, "engine stdin unavailable"))?;
        let payload = input.to_owned();
        let writer = std::thread::spawn(move || match stdin.write_all(payload.as_bytes()) {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            other => other,
        });

        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| std::io::Error::new(ErrorKind::Other, "engine stdin writer panicked"))??;

        if !output.status.success() {
            return Ok(format!(
                "Engine error: {} exited with {}\n{}",
                export,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim_end()
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Engine for CommandEngine {
    fn invoke(&self, stage: StageId, input: &str) -> String {
        let export = stage.export_name();
        debug!("Spawning {} {}", self.program.display(), export);
        match self.run(export, input) {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run engine export {}: {}", export, e);
                format!("Engine error: failed to run {}: {}", export, e)
            }
        }
    }

    fn set_user_input(&self, text: &str) {
        *self.user_input.lock() = text.to_string();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::classify::stage_succeeded;

    const SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  run_codegen) cat > /dev/null; echo "Execution result: $STAGEBENCH_USER_INPUT" ;;
  run_ir) echo "define i32 @main() {"; cat; echo "}" ;;
  run_ast) echo "syntax trouble" >&2; exit 3 ;;
  *) cat ;;
esac
"#;

    fn script_engine(dir: &tempfile::TempDir) -> CommandEngine {
        let path = dir.path().join("engine.sh");
        std::fs::write(&path, SCRIPT).unwrap();
        CommandEngine::new("/bin/sh").with_args([path.to_string_lossy().into_owned()])
    }

    #[test]
    fn test_stdin_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let engine = script_engine(&dir);

        assert_eq!(engine.invoke(StageId::Tokenize, "int x;"), "int x;");
        assert_eq!(
            engine.invoke(StageId::LowerIR, "  ret i32 42\n"),
            "define i32 @main() {\n  ret i32 42\n}\n"
        );
    }

    #[test]
    fn test_user_input_reaches_child() {
        let dir = tempfile::tempdir().unwrap();
        let engine = script_engine(&dir);
        engine.set_user_input("17");

        let output = engine.invoke(StageId::Generate, "ret i32 17");
        assert_eq!(output.trim_end(), "Execution result: 17");
    }

    #[test]
    fn test_nonzero_exit_becomes_error_text() {
        let dir = tempfile::tempdir().unwrap();
        let engine = script_engine(&dir);

        let output = engine.invoke(StageId::Parse, "int main(");
        assert!(output.starts_with("Engine error: run_ast exited"));
        assert!(output.contains("syntax trouble"));
        assert!(!stage_succeeded(StageId::Parse, &output));
    }

    #[test]
    fn test_missing_program_becomes_error_text() {
        let engine = CommandEngine::new("/nonexistent/stagebench-engine");
        let output = engine.invoke(StageId::Tokenize, "int x;");
        assert!(output.starts_with("Engine error: failed to run run_lexer"));
    }

    #[tokio::test]
    async fn test_load_rejects_missing_program() {
        assert!(CommandEngine::load("/nonexistent/stagebench-engine").await.is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(CommandEngine::load(dir.path()).await.is_err());
        assert!(CommandEngine::load("/bin/sh").await.is_ok());
    }
}
