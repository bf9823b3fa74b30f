#![allow(dead_code)]

use downstream::{CommandOutput, CommandRunner, Invocation, Result};
use std::cell::RefCell;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

type Handler = Box<dyn Fn(&Invocation) -> Result<CommandOutput>>;

/// Records every invocation and answers with a scripted handler.
pub struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    handler: Handler,
}

impl FakeRunner {
    pub fn new(handler: impl Fn(&Invocation) -> Result<CommandOutput> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// Every command succeeds with no output; `git remote -v` reports an
    /// origin named after the directory it runs in.
    pub fn happy() -> Self {
        Self::new(|inv| {
            if inv.args.first().map(String::as_str) == Some("remote") {
                return Ok(ok_with_stdout(&remotes_for(&inv.cwd)));
            }
            Ok(ok())
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::display).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        (self.handler)(invocation)
    }
}

pub fn ok() -> CommandOutput {
    CommandOutput {
        success: true,
        exit_code: Some(0),
        ..CommandOutput::default()
    }
}

pub fn ok_with_stdout(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        ..ok()
    }
}

pub fn failed(code: i32, stderr: &str) -> CommandOutput {
    CommandOutput {
        success: false,
        exit_code: Some(code),
        stderr: stderr.to_string(),
        ..CommandOutput::default()
    }
}

pub fn origin_for(dir_name: &str) -> String {
    format!("https://example.com/org/{}.git", dir_name)
}

pub fn remotes_for(dir: &Path) -> String {
    let name = dir.file_name().unwrap().to_string_lossy();
    let url = origin_for(&name);
    format!("origin\t{url} (fetch)\norigin\t{url} (push)\n")
}

/// Creates `<base>/<dir>/package.json` with the given JSON body.
pub fn write_module(base: &Path, dir: &str, manifest: &str) {
    let module_dir = base.join(dir);
    std::fs::create_dir_all(&module_dir).unwrap();
    std::fs::write(module_dir.join("package.json"), manifest).unwrap();
}

pub fn manifest_json(name: &str, deps: &[(&str, &str)], dev_deps: &[(&str, &str)]) -> String {
    fn to_map(pairs: &[(&str, &str)]) -> serde_json::Map<String, serde_json::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect()
    }

    serde_json::json!({
        "name": name,
        "version": "1.0.0",
        "dependencies": to_map(deps),
        "devDependencies": to_map(dev_deps),
    })
    .to_string()
}

/// Shared buffer for capturing log output from a scoped subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a subscriber that writes into the returned buffer.
pub fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, buffer)
}
