use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::config::MarkErrorPolicy;
use crate::format::Renderer;
use crate::keywords;
use crate::marker;
use crate::origin;
use crate::platform::{InboundEvent, MessageEvent, PlatformClient};
use crate::record::SuppressedEvent;

/// What happened to a single message event.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Origin could not be looked up; logged and dropped
    Unresolved,
    /// Origin name is not a keyword; dropped silently
    NotMatched,
    /// Read mark failed; the record is kept only under `MarkErrorPolicy::Emit`
    MarkFailed(Option<SuppressedEvent>),
    Suppressed(SuppressedEvent),
}

/// Why the event loop stopped consuming.
#[derive(Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// Credentials were rejected
    Terminated,
    /// The connection manager went away
    SourceClosed,
}

/// Marks messages from keyword-named channels and groups as read and writes
/// a record of each one.
pub struct Suppressor {
    client: Arc<dyn PlatformClient>,
    keywords: Vec<String>,
    renderer: Renderer,
    on_mark_error: MarkErrorPolicy,
}

impl Suppressor {
    pub fn new(
        client: Arc<dyn PlatformClient>,
        keywords: Vec<String>,
        renderer: Renderer,
        on_mark_error: MarkErrorPolicy,
    ) -> Self {
        Self {
            client,
            keywords,
            renderer,
            on_mark_error,
        }
    }

    /// Consume events one at a time, in arrival order, until credentials are
    /// rejected or the feed closes. Records go to `out`; failures are logged.
    pub async fn run<W: Write>(
        &self,
        events: &mut mpsc::Receiver<InboundEvent>,
        out: &mut W,
    ) -> LoopExit {
        while let Some(event) = events.recv().await {
            match event {
                InboundEvent::Message(message) => self.handle_message(message, out).await,
                InboundEvent::ConnectionError { message } => error!("Error: {}", message),
                InboundEvent::AuthInvalid => {
                    error!("Invalid credentials");
                    return LoopExit::Terminated;
                }
            }
        }
        LoopExit::SourceClosed
    }

    async fn handle_message<W: Write>(&self, event: MessageEvent, out: &mut W) {
        match self.process(event).await {
            Outcome::Suppressed(record) | Outcome::MarkFailed(Some(record)) => {
                self.emit(&record, out)
            }
            Outcome::Unresolved | Outcome::NotMatched | Outcome::MarkFailed(None) => {}
        }
    }

    /// Resolve, match, mark and record a single message.
    pub async fn process(&self, event: MessageEvent) -> Outcome {
        let origin = match origin::resolve(self.client.as_ref(), &event.channel).await {
            Ok(origin) => origin,
            Err(e) => {
                error!("{}", e);
                return Outcome::Unresolved;
            }
        };

        if !keywords::matches(&origin, &self.keywords) {
            return Outcome::NotMatched;
        }

        match marker::mark_read(self.client.as_ref(), &origin, &event).await {
            Ok(actor) => {
                info!("Marked {} {} as read up to {}", origin.kind, origin.name, event.ts);
                Outcome::Suppressed(SuppressedEvent::record(event, origin, actor))
            }
            Err(e) => {
                error!("{}", e);
                match self.on_mark_error {
                    MarkErrorPolicy::Discard => Outcome::MarkFailed(None),
                    MarkErrorPolicy::Emit => Outcome::MarkFailed(Some(SuppressedEvent::record(
                        event, e.origin, e.actor,
                    ))),
                }
            }
        }
    }

    fn emit<W: Write>(&self, record: &SuppressedEvent, out: &mut W) {
        let Some(rendered) = self.renderer.render(record) else {
            return;
        };
        if let Err(e) = out
            .write_all(rendered.as_bytes())
            .and_then(|()| out.flush())
        {
            error!("Failed to write record: {}", e);
        }
    }
}
