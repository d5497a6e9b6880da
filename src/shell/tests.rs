use crate::shell::cancel::StopHandle;
use crate::shell::commands::Command;
use crate::shell::context::{Session, ShellContext};
use crate::shell::editor::{EditSession, Key, LineEditor, ReadOutcome};
use crate::shell::history::History;
use crate::shell::parser::{apply_aliases, split_commands, tokenize};
use crate::shell::registry::CommandRegistry;
use crate::shell::terminal::{CookedScope, Terminal};
use crate::shell::{Shell, ShellState};
use anyhow::{Result, bail};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct TermState {
    raw: bool,
    enters: usize,
    leaves: usize,
}

/// Terminal fake whose state stays observable after the shell takes ownership.
#[derive(Clone, Default)]
struct FakeTerminal(Arc<Mutex<TermState>>);

impl FakeTerminal {
    fn raw(&self) -> bool {
        self.0.lock().unwrap().raw
    }

    fn counts(&self) -> (usize, usize) {
        let state = self.0.lock().unwrap();
        (state.enters, state.leaves)
    }

    fn force_raw(&self) {
        self.0.lock().unwrap().raw = true;
    }
}

impl Terminal for FakeTerminal {
    fn is_raw(&self) -> bool {
        self.raw()
    }

    fn enter_raw(&mut self) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.raw = true;
        state.enters += 1;
        Ok(())
    }

    fn leave_raw(&mut self) -> Result<()> {
        let mut state = self.0.lock().unwrap();
        state.raw = false;
        state.leaves += 1;
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Succeed,
    Fail,
    Panic,
}

/// Records every invocation, along with whether the terminal was raw at the time.
struct Recorder {
    name: &'static str,
    label: &'static str,
    behavior: Behavior,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    terminal: Option<FakeTerminal>,
    raw_during_call: Arc<Mutex<Vec<bool>>>,
}

impl Recorder {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            label: "",
            behavior: Behavior::Succeed,
            calls: Arc::default(),
            terminal: None,
            raw_during_call: Arc::default(),
        }
    }

    fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    fn behaving(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn watching(mut self, terminal: &FakeTerminal) -> Self {
        self.terminal = Some(terminal.clone());
        self
    }
}

impl Command for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn help(&self) -> &str {
        self.label
    }

    fn execute(&self, args: &[String], _ctx: &mut ShellContext<'_>) -> Result<()> {
        self.calls.lock().unwrap().push(args.to_vec());
        if let Some(terminal) = &self.terminal {
            self.raw_during_call.lock().unwrap().push(terminal.raw());
        }
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => bail!("boom"),
            Behavior::Panic => panic!("recorder panic"),
        }
    }
}

type TestShell = Shell<FakeTerminal, Cursor<Vec<u8>>, Vec<u8>>;

fn shell_with(registry: CommandRegistry, terminal: &FakeTerminal, input: &[u8]) -> TestShell {
    Shell::new(
        registry,
        Session::default(),
        terminal.clone(),
        Cursor::new(input.to_vec()),
        Vec::new(),
    )
}

fn output(shell: &TestShell) -> String {
    String::from_utf8_lossy(shell.output()).into_owned()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ---- tokenizer / parser ----

#[test]
fn test_tokenize_blank_lines() {
    assert!(tokenize("").is_empty());
    assert!(tokenize("   ").is_empty());
    assert!(tokenize(" \t ").is_empty());
}

#[test]
fn test_tokenize_basic() {
    assert_eq!(tokenize("ls -a /tmp"), names(&["ls", "-a", "/tmp"]));
    assert_eq!(tokenize("  ls\t-a   /tmp  "), names(&["ls", "-a", "/tmp"]));
}

#[test]
fn test_tokenize_idempotent_on_rejoin() {
    let tokens = tokenize("  cp  -r\tsrc   dst ");
    assert_eq!(tokenize(&tokens.join(" ")), tokens);
}

#[test]
fn test_split_commands() {
    let segments: Vec<&str> = split_commands("badcmd; ls ;;pwd").collect();
    assert_eq!(segments, vec!["badcmd", " ls ", "", "pwd"]);
}

#[test]
fn test_alias_expansion() {
    let mut aliases = HashMap::new();
    aliases.insert("ll".to_string(), "ls".to_string());

    assert_eq!(apply_aliases("ll -la", &aliases), "ls -la");
    assert_eq!(apply_aliases("ls -la", &aliases), "ls -la");
    assert_eq!(apply_aliases("", &aliases), "");
    // Only the first token is considered
    assert_eq!(apply_aliases("echo ll", &aliases), "echo ll");
    // Reassembled with single spaces
    assert_eq!(apply_aliases("  ll   -la ", &aliases), "ls -la");
}

#[test]
fn test_alias_is_not_recursive() {
    let mut aliases = HashMap::new();
    aliases.insert("a".to_string(), "b".to_string());
    aliases.insert("b".to_string(), "c".to_string());
    assert_eq!(apply_aliases("a x", &aliases), "b x");
}

// ---- registry ----

#[test]
fn test_registry_replaces_silently() {
    let mut registry = CommandRegistry::new();
    registry.register("x", Box::new(Recorder::new("x").labelled("first")));
    registry.register("x", Box::new(Recorder::new("x").labelled("second")));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("x").unwrap().help(), "second");
    assert!(registry.get("y").is_none());
}

#[test]
fn test_registry_list_is_sorted() {
    let mut registry = CommandRegistry::new();
    for name in ["pwd", "cat", "ls2", "exit", "ls"] {
        registry.register(name, Box::new(Recorder::new("unused")));
    }
    assert_eq!(registry.command_list(), names(&["cat", "exit", "ls", "ls2", "pwd"]));
}

// ---- history & line editor ----

struct EditHarness {
    editor: LineEditor,
    history: History,
    candidates: Vec<String>,
    stop: StopHandle,
    out: Vec<u8>,
}

impl EditHarness {
    fn new(candidates: &[&str]) -> Self {
        Self {
            editor: LineEditor::new(),
            history: History::default(),
            candidates: names(candidates),
            stop: StopHandle::new(),
            out: Vec::new(),
        }
    }

    fn press(&mut self, key: Key) -> Option<ReadOutcome> {
        let mut session = EditSession {
            prompt: "> ",
            history: &mut self.history,
            candidates: &self.candidates,
            stop: &self.stop,
        };
        self.editor.handle_key(key, &mut self.out, &mut session).unwrap()
    }

    fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.press(Key::Char(c));
        }
    }

    fn output(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }
}

#[test]
fn test_history_up_and_down() {
    let mut h = EditHarness::new(&[]);
    for line in ["a", "b", "c"] {
        h.history.push(line);
    }

    let mut seen = Vec::new();
    for _ in 0..3 {
        h.press(Key::Up);
        seen.push(h.editor.buffer().to_string());
    }
    assert_eq!(seen, vec!["c", "b", "a"]);

    // Clamped at the oldest entry
    h.press(Key::Up);
    assert_eq!(h.editor.buffer(), "a");

    h.press(Key::Down);
    assert_eq!(h.editor.buffer(), "b");
}

#[test]
fn test_history_down_past_end_clears_line() {
    let mut h = EditHarness::new(&[]);
    h.history.push("a");
    h.history.push("b");

    h.press(Key::Up);
    assert_eq!(h.editor.buffer(), "b");
    h.press(Key::Down);
    assert_eq!(h.editor.buffer(), "");
    assert_eq!(h.history.cursor(), h.history.len());
}

#[test]
fn test_history_up_on_empty_keeps_line() {
    let mut h = EditHarness::new(&[]);
    h.type_str("pw");
    h.press(Key::Up);
    assert_eq!(h.editor.buffer(), "pw");
}

#[test]
fn test_history_skips_blank_and_evicts_oldest() {
    let mut history = History::with_capacity(2);
    history.push("");
    history.push("   ");
    assert!(history.is_empty());

    history.push("one");
    history.push("two");
    history.push("three");
    assert_eq!(history.iter().collect::<Vec<_>>(), vec!["two", "three"]);
    assert_eq!(history.cursor(), 2);
}

#[test]
fn test_tab_completion() {
    let mut h = EditHarness::new(&["cat", "ls", "ls2"]);

    h.type_str("l");
    h.press(Key::Tab);
    assert_eq!(h.editor.buffer(), "l");
    let out = h.output();
    assert!(out.contains("ls"));
    assert!(out.contains("ls2"));

    h.press(Key::Backspace);
    h.type_str("c");
    h.press(Key::Tab);
    assert_eq!(h.editor.buffer(), "cat");

    let mut h = EditHarness::new(&["cat", "ls", "ls2"]);
    h.type_str("z");
    h.press(Key::Tab);
    assert_eq!(h.editor.buffer(), "z");
}

#[test]
fn test_backspace_and_interrupt() {
    let mut h = EditHarness::new(&[]);
    h.press(Key::Backspace);
    assert_eq!(h.editor.buffer(), "");

    h.type_str("lsx");
    h.press(Key::Backspace);
    assert_eq!(h.editor.buffer(), "ls");

    h.press(Key::Interrupt);
    assert_eq!(h.editor.buffer(), "");
    assert!(h.output().contains("^C"));
    assert!(!h.stop.is_stopped());
}

#[test]
fn test_enter_and_eof() {
    let mut h = EditHarness::new(&[]);
    h.type_str("pwd");
    assert_eq!(h.press(Key::Enter), Some(ReadOutcome::Line("pwd".to_string())));
    assert_eq!(h.editor.buffer(), "");

    assert_eq!(h.press(Key::Eof), Some(ReadOutcome::Stopped));
    assert!(h.stop.is_stopped());
}

#[test]
fn test_plain_append_echoes_character_only() {
    let mut h = EditHarness::new(&[]);
    h.type_str("ab");
    assert_eq!(h.output(), "ab");
}

// ---- dispatch ----

#[test]
fn test_unknown_command_does_not_abort_line() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"");
    shell.execute_line("badcmd; ls -a").unwrap();

    assert!(output(&shell).contains("unknown command: badcmd"));
    assert_eq!(*calls.lock().unwrap(), vec![names(&["-a"])]);
}

#[test]
fn test_command_failure_is_reported_and_next_runs() {
    let terminal = FakeTerminal::default();
    let bad = Recorder::new("bad").behaving(Behavior::Fail);
    let good = Recorder::new("good");
    let good_calls = good.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(bad));
    registry.register_command(Box::new(good));

    let mut shell = shell_with(registry, &terminal, b"");
    shell.execute_line("bad; good").unwrap();

    assert!(output(&shell).contains("bad: boom"));
    assert_eq!(good_calls.lock().unwrap().len(), 1);
}

#[test]
fn test_raw_mode_restored_after_failing_command() {
    let terminal = FakeTerminal::default();
    let bad = Recorder::new("bad").behaving(Behavior::Fail).watching(&terminal);
    let raw_during = bad.raw_during_call.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(bad));

    let mut shell = shell_with(registry, &terminal, b"");
    terminal.force_raw();
    shell.execute_line("bad").unwrap();

    assert_eq!(*raw_during.lock().unwrap(), vec![false]);
    assert!(terminal.raw());
    assert_eq!(terminal.counts(), (1, 1));
}

#[test]
fn test_raw_mode_restored_after_panicking_command() {
    let terminal = FakeTerminal::default();
    let panicky = Recorder::new("panicky").behaving(Behavior::Panic).watching(&terminal);
    let next = Recorder::new("next");
    let next_calls = next.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(panicky));
    registry.register_command(Box::new(next));

    let mut shell = shell_with(registry, &terminal, b"");
    terminal.force_raw();
    shell.execute_line("panicky; next").unwrap();

    assert!(terminal.raw());
    assert!(output(&shell).contains("panicky: command panicked"));
    assert_eq!(next_calls.lock().unwrap().len(), 1);
}

#[test]
fn test_cooked_scope_is_noop_when_already_cooked() {
    let terminal = FakeTerminal::default();
    let mut handle = terminal.clone();
    {
        let _scope = CookedScope::enter(&mut handle).unwrap();
    }
    assert!(!terminal.raw());
    assert_eq!(terminal.counts(), (0, 0));
}

#[test]
fn test_raw_mode_toggles_are_idempotent() {
    let terminal = FakeTerminal::default();
    let mut handle = terminal.clone();

    handle.enable_raw_mode().unwrap();
    handle.enable_raw_mode().unwrap();
    assert!(terminal.raw());
    assert_eq!(terminal.counts(), (1, 0));

    handle.disable_raw_mode().unwrap();
    handle.disable_raw_mode().unwrap();
    assert!(!terminal.raw());
    assert_eq!(terminal.counts(), (1, 1));
}

#[test]
fn test_alias_applied_before_dispatch() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut aliases = HashMap::new();
    aliases.insert("ll".to_string(), "ls".to_string());
    let session = Session::default().with_aliases(aliases);
    let mut shell = Shell::new(registry, session, terminal.clone(), Cursor::new(Vec::new()), Vec::new());

    shell.execute_line("ll -la").unwrap();
    assert_eq!(*calls.lock().unwrap(), vec![names(&["-la"])]);
}

// ---- main loop ----

#[test]
fn test_run_dispatches_and_records_history() {
    let terminal = FakeTerminal::default();
    let echo = Recorder::new("echo").watching(&terminal);
    let calls = echo.calls.clone();
    let raw_during = echo.raw_during_call.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(echo));

    let mut shell = shell_with(registry, &terminal, b"echo hi\r\recho a; echo b\rexit\r");
    assert_eq!(shell.state(), ShellState::Initializing);
    shell.run().unwrap();

    assert_eq!(shell.state(), ShellState::Stopped);
    assert_eq!(
        *calls.lock().unwrap(),
        vec![names(&["hi"]), names(&["a"]), names(&["b"])]
    );
    assert_eq!(*raw_during.lock().unwrap(), vec![false, false, false]);
    assert_eq!(
        shell.session().history.iter().collect::<Vec<_>>(),
        vec!["echo hi", "echo a; echo b", "exit"]
    );
    // exit was registered on start; raw mode is off once the loop ends
    assert!(shell.registry().contains("exit"));
    assert!(!terminal.raw());
}

#[test]
fn test_run_recalls_history_with_arrows() {
    let terminal = FakeTerminal::default();
    let echo = Recorder::new("echo");
    let calls = echo.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(echo));

    let mut shell = shell_with(registry, &terminal, b"echo a\r\x1b[A\r");
    shell.run().unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![names(&["a"]), names(&["a"])]);
}

#[test]
fn test_run_ignores_garbled_escape() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"l\x1bx\x00s\r");
    shell.run().unwrap();

    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn test_ctrl_d_stops_without_dispatch() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"ls\x04ls\r");
    shell.run().unwrap();

    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(shell.state(), ShellState::Stopped);
    assert!(shell.session().history.is_empty());
}

#[test]
fn test_ctrl_c_discards_line_and_continues() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"rm -rf\x03ls\r");
    shell.run().unwrap();

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert!(!output(&shell).contains("unknown command"));
}

#[test]
fn test_tab_completes_in_loop() {
    let terminal = FakeTerminal::default();
    let cat = Recorder::new("cat");
    let calls = cat.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(cat));

    let mut shell = shell_with(registry, &terminal, b"ca\t f\r");
    shell.run().unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![names(&["f"])]);
}

#[test]
fn test_exit_skips_remaining_subcommands() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"exit; ls\rls\r");
    shell.run().unwrap();

    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(shell.session().history.iter().collect::<Vec<_>>(), vec!["exit; ls"]);
}

#[test]
fn test_stop_before_run_exits_immediately() {
    let terminal = FakeTerminal::default();
    let ls = Recorder::new("ls");
    let calls = ls.calls.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(ls));

    let mut shell = shell_with(registry, &terminal, b"ls\r");
    let remote = shell.stop_handle();
    remote.stop();
    shell.run().unwrap();

    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(shell.state(), ShellState::Stopped);
}

#[test]
fn test_run_script_reads_lines() {
    let terminal = FakeTerminal::default();
    let echo = Recorder::new("echo").watching(&terminal);
    let calls = echo.calls.clone();
    let raw_during = echo.raw_during_call.clone();
    let mut registry = CommandRegistry::new();
    registry.register_command(Box::new(echo));

    let mut shell = shell_with(registry, &terminal, b"echo one\r\nnope\necho two");
    shell.run_script().unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![names(&["one"]), names(&["two"])]);
    assert_eq!(*raw_during.lock().unwrap(), vec![false, false]);
    assert!(output(&shell).contains("unknown command: nope"));
    assert_eq!(shell.session().history.len(), 3);
    assert_eq!(terminal.counts(), (0, 0));
}

#[cfg(unix)]
#[test]
fn test_stop_reaches_idle_prompt() {
    use crate::shell::terminal::PolledInput;
    use std::os::unix::net::UnixStream;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    let (handle_tx, handle_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();

    // Keyboard that never types anything; the writer end stays open.
    let (keyboard, silent) = UnixStream::pair().unwrap();
    let worker = thread::spawn(move || {
        let terminal = FakeTerminal::default();
        let mut shell = Shell::new(
            CommandRegistry::new(),
            Session::default(),
            terminal.clone(),
            PolledInput::new(keyboard),
            Vec::new(),
        );
        handle_tx.send(shell.stop_handle()).unwrap();
        let result = shell.run();
        done_tx.send((result.is_ok(), shell.state(), terminal.raw())).unwrap();
    });

    let stop = handle_rx.recv().unwrap();
    thread::sleep(Duration::from_millis(100));
    stop.stop();

    let (ok, state, raw) = done_rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(ok);
    assert_eq!(state, ShellState::Stopped);
    assert!(!raw);
    worker.join().unwrap();
    drop(silent);
}

#[test]
fn test_run_script_finishes_in_stopped_state() {
    let terminal = FakeTerminal::default();
    let mut shell = shell_with(CommandRegistry::new(), &terminal, b"nope\n");
    shell.run_script().unwrap();
    assert_eq!(shell.state(), ShellState::Stopped);
}
