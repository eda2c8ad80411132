//! Event worker: the single consumer of the pipeline queue.
//!
//! For each dequeued event the worker looks up the route for its source
//! pin, fires the local pulse (if any) and then the outbound notification
//! (if any).  Events are handled strictly one at a time in dequeue order.
//! Neither a failed pulse nor a failed POST stops the loop.

use log::{debug, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::{EventSink, NotifyOutcome, NotifyPort, PulseSink};
use crate::config::{MAX_MONITORED_PINS, NodeConfig, NotifyUrl, RoutePulse};

use super::{EventPipeline, MotionEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedRoute {
    pin: i32,
    url: Option<NotifyUrl>,
    pulse: Option<RoutePulse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// No route for the event's pin.
    Ignored,
    Handled { pulsed: bool, notified: bool },
}

pub struct Worker<'p, N, S, E> {
    pipeline: &'p EventPipeline,
    routes: heapless::Vec<ResolvedRoute, MAX_MONITORED_PINS>,
    notifier: N,
    pulser: S,
    sink: E,
    handled: u32,
}

impl<'p, N: NotifyPort, S: PulseSink, E: EventSink> Worker<'p, N, S, E> {
    pub fn new(pipeline: &'p EventPipeline, config: &NodeConfig, notifier: N, pulser: S, sink: E) -> Self {
        let routes = config
            .routes
            .iter()
            .map(|r| ResolvedRoute {
                pin: r.pin,
                url: r.event.as_deref().and_then(|name| config.notify_url(name)),
                pulse: r.pulse,
            })
            .collect();
        Self {
            pipeline,
            routes,
            notifier,
            pulser,
            sink,
            handled: 0,
        }
    }

    /// Number of events that matched a route.
    pub fn handled(&self) -> u32 {
        self.handled
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn pulser(&self) -> &S {
        &self.pulser
    }

    pub fn dispatch(&mut self, event: MotionEvent) -> Dispatch {
        let Some(route) = self.routes.iter().find(|r| r.pin == event.source_pin) else {
            debug!("worker: no route for pin {}", event.source_pin);
            self.sink.emit(&NodeEvent::MotionIgnored { pin: event.source_pin });
            return Dispatch::Ignored;
        };

        self.handled += 1;
        self.sink.emit(&NodeEvent::MotionDispatched {
            pin: event.source_pin,
            timestamp_ms: event.timestamp_ms,
        });

        let mut pulsed = false;
        if let Some(p) = route.pulse {
            match self.pulser.pulse(p.freq, p.amplitude, p.repeat_count) {
                Ok(report) => {
                    pulsed = true;
                    self.sink.emit(&NodeEvent::PulseCompleted(report));
                }
                Err(e) => {
                    warn!("worker: pulse on pin {} failed: {}", event.source_pin, e);
                    self.sink.emit(&NodeEvent::PulseFailed(e));
                }
            }
        }

        let mut notified = false;
        if let Some(url) = &route.url {
            match self.notifier.notify(url) {
                NotifyOutcome::Delivered { status, content_length } => {
                    notified = true;
                    self.sink.emit(&NodeEvent::NotifyDelivered { status, content_length });
                }
                NotifyOutcome::Failed(e) => {
                    self.sink.emit(&NodeEvent::NotifyFailed(e));
                }
            }
        }

        Dispatch::Handled { pulsed, notified }
    }

    /// Handle everything currently queued without blocking.
    pub fn process_pending(&mut self) -> usize {
        let mut n = 0;
        while let Some(event) = self.pipeline.queue().try_dequeue() {
            self.dispatch(event);
            n += 1;
        }
        n
    }

    /// Consumer loop.  `park` blocks until a producer signals new work.
    pub fn run(mut self, mut park: impl FnMut()) -> ! {
        info!("worker: started, {} route(s)", self.routes.len());
        loop {
            let event = self.pipeline.queue().dequeue_blocking(&mut park);
            self.dispatch(event);
        }
    }
}
