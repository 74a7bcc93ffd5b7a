use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use dashboard_core::{Effect, Msg, SessionGeneration};
use dashboard_engine::{EngineEvent, EngineHandle};
use dashboard_logging::{dash_debug, dash_info};

use crate::view::Input;

/// Executes reducer effects on the engine and feeds engine events back into
/// the view loop as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    url: String,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, url: String, input_tx: mpsc::Sender<Input>) -> Self {
        let runner = Self { engine, url };
        runner.spawn_event_loop(input_tx);
        runner
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::OpenSession { generation } => {
                    dash_info!("OpenSession generation={} url={}", generation.0, self.url);
                    self.engine.open(generation.0, self.url.as_str());
                }
                Effect::Send {
                    generation,
                    request,
                } => {
                    dash_debug!(
                        "Send generation={} page={} limit={}",
                        generation.0,
                        request.page,
                        request.limit
                    );
                    self.engine.send(generation.0, request.to_json());
                }
                Effect::CloseSession { generation } => {
                    dash_info!("CloseSession generation={}", generation.0);
                    self.engine.close(generation.0);
                }
            }
        }
    }

    fn spawn_event_loop(&self, input_tx: mpsc::Sender<Input>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if input_tx.send(Input::Msg(map_event(event))).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Opened { session } => Msg::SessionOpened {
            generation: SessionGeneration(session),
        },
        EngineEvent::Frame { session, text } => Msg::FrameReceived {
            generation: SessionGeneration(session),
            text,
        },
        EngineEvent::Failed { session, error } => Msg::SessionFailed {
            generation: SessionGeneration(session),
            message: error.to_string(),
        },
        EngineEvent::Closed { session } => Msg::SessionClosed {
            generation: SessionGeneration(session),
        },
    }
}
