use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Offset};
use dashboard_core::{update, Msg, SortDescriptor, ViewState};
use dashboard_engine::{EngineHandle, SessionSettings};
use dashboard_logging::{dash_info, dash_warn};

use crate::commands::{parse_command, Command, HELP};
use crate::effects::EffectRunner;
use crate::render::{render_view, TableRow};

const TICK_INTERVAL: Duration = Duration::from_millis(100);
const CLOSE_GRACE: Duration = Duration::from_millis(250);
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Everything that reaches the view loop.
pub enum Input {
    Msg(Msg),
    Command(Command),
    BadCommand(String),
}

pub struct ViewOptions {
    pub url: String,
    pub page: u32,
    pub limit: u32,
    pub sort: Option<SortDescriptor>,
    pub session: SessionSettings,
}

/// Runs one collection view until `quit` or end of input.
pub fn run_view<R: TableRow>(options: ViewOptions) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let engine = EngineHandle::new(options.session);
    let runner = EffectRunner::new(engine, options.url, input_tx.clone());
    spawn_stdin_reader(input_tx.clone());
    spawn_ticker(input_tx.clone());

    let mut state = ViewState::<R>::new(options.page, options.limit).with_sort(options.sort);
    let mut out = io::stdout();
    let mut pending_render = true;
    let mut notice: Option<String> = Some(HELP.to_string());

    input_tx
        .send(Input::Msg(Msg::Mounted))
        .context("view loop input closed")?;

    while let Ok(input) = input_rx.recv() {
        let msg = match input {
            Input::Msg(msg) => msg,
            Input::Command(command) => {
                let view = state.view();
                notice = matches!(command, Command::Help).then(|| HELP.to_string());
                pending_render = true;
                match command.to_msg(view.page, view.total_pages()) {
                    Some(msg) => msg,
                    None => continue,
                }
            }
            Input::BadCommand(message) => {
                notice = Some(format!("{message}. {HELP}"));
                pending_render = true;
                continue;
            }
        };

        let quitting = msg == Msg::Unmounted;
        let is_tick = msg == Msg::Tick;
        let (next, effects) = update(state, msg);
        state = next;
        runner.run(effects);
        pending_render |= state.consume_dirty();

        if quitting {
            dash_info!("View closed");
            break;
        }
        if is_tick && pending_render {
            draw(&mut out, &state, notice.as_deref())?;
            pending_render = false;
        }
    }

    // Lets the engine thread send the close frame before the process exits.
    thread::sleep(CLOSE_GRACE);
    Ok(())
}

fn draw<R: TableRow>(
    out: &mut io::Stdout,
    state: &ViewState<R>,
    notice: Option<&str>,
) -> anyhow::Result<()> {
    let offset = Local::now().offset().fix();
    let mut lock = out.lock();
    write!(lock, "{CLEAR_SCREEN}").context("write to terminal")?;
    render_view(&mut lock, &state.view(), offset, notice).context("render view")?;
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    dash_warn!("stdin read failed: {}", err);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let input = match parse_command(&line) {
                Ok(command) => Input::Command(command),
                Err(err) => Input::BadCommand(err.to_string()),
            };
            if input_tx.send(input).is_err() {
                return;
            }
        }
        // End of input behaves like `quit`.
        let _ = input_tx.send(Input::Command(Command::Quit));
    });
}

fn spawn_ticker(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while input_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}
