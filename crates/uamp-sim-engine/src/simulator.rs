//! The engine: scheduler, module registry, and main run loop.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

use chrono::Duration;
use tracing::{debug, info, warn};

use uamp_sim_common::{DeviceState, Event, ModuleError, ScheduleError, SimError, Timestamp};
use uamp_sim_metrics::metric_defs;
use uamp_sim_queue::{PriorityQueue, Tier};
use uamp_sim_trace::TraceSource;

use crate::alarm::{AlarmHandle, AlarmRecord, AlarmTarget};
use crate::dispatcher::Dispatcher;
use crate::module::{SimModule, SimModuleType};

/// How many trace events to buffer into the run queue at a time, and
/// the low-water mark that triggers a refill.
pub const EVENT_QUEUE_THRESHOLD: usize = 100;

enum QueueItem {
    Trace(Event),
    Alarm { id: u64, timestamp: Timestamp },
}

impl QueueItem {
    fn timestamp(&self) -> Timestamp {
        match self {
            QueueItem::Trace(event) => event.timestamp,
            QueueItem::Alarm { timestamp, .. } => *timestamp,
        }
    }
}

/// The simulation engine: owns the device state, event queue, module
/// registry, and dispatch fabric, and drives the main run loop.
pub struct Simulator {
    modules: Vec<Option<Box<dyn SimModule>>>,
    module_index: HashMap<String, usize>,
    module_type_index: HashMap<SimModuleType, VecDeque<usize>>,
    dispatcher: Dispatcher,
    device_state: DeviceState,
    queue: PriorityQueue<QueueItem>,
    alarms: HashMap<u64, AlarmRecord>,
    next_alarm_id: u64,
    current_time: Timestamp,
    warmup_period: Duration,
    trace: Option<Box<dyn TraceSource>>,
    verbose: bool,
    debug_mode: bool,
    debug_interval: u32,
    debug_interval_cnt: u32,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator {
            modules: Vec::new(),
            module_index: HashMap::new(),
            module_type_index: HashMap::new(),
            dispatcher: Dispatcher::default(),
            device_state: DeviceState::default(),
            queue: PriorityQueue::new(),
            alarms: HashMap::new(),
            next_alarm_id: 0,
            current_time: Timestamp::epoch(),
            warmup_period: Duration::zero(),
            trace: None,
            verbose: false,
            debug_mode: false,
            debug_interval: 1,
            debug_interval_cnt: 0,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_debug_mode(&mut self, debug_mode: bool) {
        self.debug_mode = debug_mode;
    }

    pub fn set_warmup_period(&mut self, warmup_period: Duration) {
        self.warmup_period = warmup_period;
    }

    /// Build the trace source and adopt its start time as the
    /// simulator's initial `current_time`, matching
    /// `original_source/uamp_sim.py::build`'s
    /// `self._trace_reader.build(); ... self._current_time = self._trace_reader.get_start_time()`.
    ///
    /// A trace with zero events has no start time to adopt; in that
    /// case `current_time` falls back to [`Timestamp::epoch`] so that
    /// `build_modules()` (which runs before the main loop and may
    /// register alarms, e.g. the preload predictor's decay tick) never
    /// has to contend with an unset current time.
    pub fn attach_trace(
        &mut self,
        mut trace: Box<dyn TraceSource>,
    ) -> Result<(), uamp_sim_common::TraceError> {
        trace.build()?;
        self.current_time = trace.start_time().unwrap_or_else(Timestamp::epoch);
        self.trace = Some(trace);
        Ok(())
    }

    pub fn has_module_instance(&self, name: &str) -> bool {
        self.module_index.contains_key(name)
    }

    pub fn get_module_instance(&self, name: &str) -> Option<&dyn SimModule> {
        let id = *self.module_index.get(name)?;
        self.modules[id].as_deref()
    }

    /// The first-registered module of the given type, matching
    /// registration (non-override) order.
    pub fn get_module_for_type(&self, module_type: SimModuleType) -> Option<&dyn SimModule> {
        let id = *self.module_type_index.get(&module_type)?.front()?;
        self.modules[id].as_deref()
    }

    /// Register a module. When `override_priority` is set, this module
    /// becomes the one returned first by [`Self::get_module_for_type`]
    /// for its type; otherwise it is appended behind any others of the
    /// same type.
    pub fn register(
        &mut self,
        module: Box<dyn SimModule>,
        override_priority: bool,
    ) -> Result<(), ModuleError> {
        let name = module.name().to_string();
        if self.module_index.contains_key(&name) {
            return Err(ModuleError::AlreadyRegistered(name));
        }
        let module_type = module.module_type();
        let id = self.modules.len();
        self.modules.push(Some(module));
        self.module_index.insert(name, id);
        let bucket = self.module_type_index.entry(module_type).or_default();
        if override_priority {
            bucket.push_front(id);
        } else {
            bucket.push_back(id);
        }
        Ok(())
    }

    pub fn current_time(&self) -> Timestamp {
        self.current_time
    }

    pub fn device_state(&self) -> &DeviceState {
        &self.device_state
    }

    pub fn device_state_mut(&mut self) -> &mut DeviceState {
        &mut self.device_state
    }

    /// Run each registered module's `build` in registration order.
    pub fn build_modules(&mut self) -> Result<(), ModuleError> {
        for id in 0..self.modules.len() {
            let mut module = self.modules[id].take().expect("module missing during build");
            let mut ctx = SimContext { sim: self, module_id: id };
            let result = module.build(&mut ctx);
            self.modules[id] = Some(module);
            result?;
        }
        Ok(())
    }

    /// Subscribe a module to an event type, with an optional filter.
    pub(crate) fn subscribe(
        &mut self,
        module_id: usize,
        event_type: uamp_sim_common::EventType,
        filter: Option<Box<dyn Fn(&Event) -> bool>>,
    ) {
        self.dispatcher.subscribe(event_type, module_id, filter);
    }

    /// Register an alarm on behalf of `module_id`.
    pub(crate) fn register_module_alarm(
        &mut self,
        module_id: usize,
        alarm_name: String,
        period: Option<Duration>,
    ) -> AlarmHandle {
        let cancelled = AlarmRecord::new_handle();
        let id = self.next_alarm_id;
        self.next_alarm_id += 1;
        self.alarms.insert(
            id,
            AlarmRecord {
                target: AlarmTarget::Module { module_id, alarm_name },
                period,
                cancelled: cancelled.clone(),
            },
        );
        let timestamp = self.current_time();
        self.queue
            .push(timestamp, Tier::Alarm, QueueItem::Alarm { id, timestamp });
        AlarmHandle { cancelled }
    }

    fn register_enable_stats_alarm(&mut self, timestamp: Timestamp) {
        let cancelled = AlarmRecord::new_handle();
        let id = self.next_alarm_id;
        self.next_alarm_id += 1;
        self.alarms.insert(
            id,
            AlarmRecord {
                target: AlarmTarget::EnableStatsCollection,
                period: None,
                cancelled,
            },
        );
        self.queue
            .push(timestamp, Tier::Simulator, QueueItem::Alarm { id, timestamp });
    }

    /// Broadcast an event to every subscribed, filter-matching module.
    ///
    /// The event must carry the engine's current time — broadcasting a
    /// stamped event from some other instant is a fatal scheduling
    /// error, since it would let a handler observe an event the engine
    /// itself couldn't have reached yet (or already passed). Callers
    /// that don't yet have a timestamp should stamp the event at
    /// `current_time()` before calling this, which [`SimContext::broadcast`]
    /// does automatically.
    pub(crate) fn broadcast(&mut self, event: &Event) -> Result<(), SimError> {
        let now = self.current_time();
        if event.timestamp != now {
            return Err(ScheduleError::InvalidBroadcastTime {
                event_time: event.timestamp.to_string(),
                now: now.to_string(),
            }
            .into());
        }
        apply_event_to_device_state(&mut self.device_state, event);
        let labels = [("event_type", event.event_type().wire_name().to_string())];
        metrics::counter!(metric_defs::EVENTS_DISPATCHED.name, &labels).increment(1);
        let listener_ids = self.dispatcher.matching_listeners(event);
        for module_id in listener_ids {
            let mut module = match self.modules[module_id].take() {
                Some(m) => m,
                None => continue,
            };
            let mut ctx = SimContext { sim: self, module_id };
            let result = module.handle_event(event, &mut ctx);
            self.modules[module_id] = Some(module);
            result?;
        }
        Ok(())
    }

    fn fire_alarm(&mut self, alarm_id: u64) -> Result<(), SimError> {
        let record = match self.alarms.remove(&alarm_id) {
            Some(r) => r,
            None => return Err(ScheduleError::AlarmNotFound(alarm_id.to_string()).into()),
        };
        if record.cancelled.get() {
            return Ok(());
        }

        metrics::counter!(metric_defs::ALARMS_FIRED.name).increment(1);
        match &record.target {
            AlarmTarget::EnableStatsCollection => {
                for slot in self.modules.iter_mut().flatten() {
                    slot.enable_stats_collection();
                }
                debug!("warmup period elapsed, stats collection enabled");
            }
            AlarmTarget::Module { module_id, alarm_name } => {
                let module_id = *module_id;
                let alarm_name = alarm_name.clone();
                let mut module = match self.modules[module_id].take() {
                    Some(m) => m,
                    None => {
                        warn!(alarm = %alarm_name, "alarm fired for module mid-call, dropping firing");
                        return Ok(());
                    }
                };
                let mut ctx = SimContext { sim: self, module_id };
                let result = module.handle_alarm(&alarm_name, &mut ctx);
                self.modules[module_id] = Some(module);
                result?;
            }
        }

        // A periodic alarm only re-enqueues itself while the trace still
        // has events left to deliver; once the trace is exhausted the
        // queue must be allowed to drain so the run loop can terminate,
        // matching spec.md's "fires ... until trace end or cancellation".
        let trace_exhausted = self.trace.as_ref().map(|t| t.end_of_trace()).unwrap_or(true);
        if let Some(period) = record.period.filter(|_| !trace_exhausted) {
            let next_time = self.current_time() + period;
            let new_id = self.next_alarm_id;
            self.next_alarm_id += 1;
            self.alarms.insert(
                new_id,
                AlarmRecord {
                    target: record.target,
                    period: record.period,
                    cancelled: record.cancelled,
                },
            );
            self.queue.push(
                next_time,
                Tier::Alarm,
                QueueItem::Alarm {
                    id: new_id,
                    timestamp: next_time,
                },
            );
        }
        Ok(())
    }

    fn populate_from_trace(&mut self) {
        let trace = self.trace.as_mut().expect("trace not attached");
        let events = trace.get_events(EVENT_QUEUE_THRESHOLD);
        for event in events {
            let ts = event.timestamp;
            self.queue.push(ts, Tier::Trace, QueueItem::Trace(event));
        }
    }

    /// Run the simulation to completion, writing each module's stats
    /// block to stdout. Equivalent to [`Self::run_with_output`] against
    /// `io::stdout()`.
    pub fn run(&mut self) -> Result<(), SimError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(&mut out)
    }

    /// Run the simulation to completion: drain the trace and event
    /// queue, then call `print_stats`/`finish` on every module, writing
    /// the `======== <name> Stats ========`-delimited stats blocks to
    /// `out` rather than assuming stdout. Tests use this to capture
    /// stats output without redirecting the process's real stdout.
    pub fn run_with_output(&mut self, out: &mut dyn Write) -> Result<(), SimError> {
        if self.trace.is_none() {
            return Err(ScheduleError::EmptyQueue.into());
        }

        if self.debug_mode {
            self.debug_interval_cnt = 0;
            self.run_debug_prompt();
        }

        let warmup_end = self.current_time() + self.warmup_period;
        self.register_enable_stats_alarm(warmup_end);

        loop {
            let trace_done = self.trace.as_ref().unwrap().end_of_trace();
            if trace_done && self.queue.is_empty() {
                break;
            }

            if self.queue.len() < EVENT_QUEUE_THRESHOLD && !trace_done {
                self.populate_from_trace();
                continue;
            }

            let next_trace_ts = self.trace.as_ref().unwrap().peek_event().map(|e| e.timestamp);
            let queue_ts = self.queue.peek_timestamp();

            if let (Some(queue_ts), Some(trace_ts)) = (queue_ts, next_trace_ts) {
                if queue_ts > trace_ts {
                    self.populate_from_trace();
                    continue;
                }
            }

            let item = self.queue.pop()?;
            metrics::gauge!(metric_defs::QUEUE_DEPTH.name).set(self.queue.len() as f64);
            self.current_time = item.timestamp();

            if self.verbose {
                match &item {
                    QueueItem::Trace(event) => println!("{event}"),
                    QueueItem::Alarm { timestamp, .. } => println!("alarm@{timestamp}"),
                }
            }

            if self.debug_mode {
                self.debug_interval_cnt += 1;
                if self.debug_interval_cnt == self.debug_interval {
                    self.run_debug_prompt();
                    self.debug_interval_cnt = 0;
                }
            }

            self.execute(item)?;
        }

        self.finish_modules(out)
    }

    fn execute(&mut self, item: QueueItem) -> Result<(), SimError> {
        match item {
            QueueItem::Trace(event) => self.broadcast(&event),
            QueueItem::Alarm { id, .. } => self.fire_alarm(id),
        }
    }

    fn finish_modules(&mut self, out: &mut dyn Write) -> Result<(), SimError> {
        for slot in self.modules.iter() {
            if let Some(module) = slot {
                let header = format!("======== {} Stats ========\n", module.name());
                out.write_all(header.as_bytes())?;
                module.print_stats(out)?;
                let footer = "=".repeat(header.len() - 1);
                out.write_all(footer.as_bytes())?;
                out.write_all(b"\n")?;
            }
        }
        for slot in self.modules.iter_mut() {
            if let Some(module) = slot {
                module.finish()?;
            }
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.finish();
        }
        info!("simulation finished");
        Ok(())
    }

    fn run_debug_prompt(&mut self) {
        loop {
            print!("(uamp-sim debug) $ ");
            if io::stdout().flush().is_err() {
                return;
            }
            let mut line = String::new();
            if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
                return;
            }
            let command = line.trim();
            if command.is_empty() {
                return;
            }
            let mut tokens = command.split_whitespace();
            let cmd = tokens.next().unwrap_or("");
            let args: Vec<&str> = tokens.collect();
            match cmd {
                "quit" | "exit" | "q" => {
                    println!("Terminating Simulation");
                    std::process::exit(1);
                }
                "interval" => {
                    if args.len() == 1 {
                        match args[0].parse::<u32>() {
                            Ok(n) => self.debug_interval = n,
                            Err(_) => {
                                println!("Command Usage Error: interval command expects one numerical value")
                            }
                        }
                    } else {
                        println!("Command Usage Error: interval command expects one numerical value");
                    }
                }
                "verbose" => match args.len() {
                    0 => self.verbose = true,
                    1 => match args[0] {
                        "on" => self.verbose = true,
                        "off" => self.verbose = false,
                        _ => println!(
                            "Command Usage Error: verbose command expects 'on' or 'off' for argument"
                        ),
                    },
                    _ => println!("Command Usage Error: verbose command expects at most one argument"),
                },
                _ => {}
            }
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_event_to_device_state(state: &mut DeviceState, event: &Event) {
    use uamp_sim_common::EventPayload;
    match &event.payload {
        EventPayload::Screen { state: s } => state.screen_state = *s,
        EventPayload::ScreenOrientation { orientation } => state.screen_orientation = *orientation,
        EventPayload::Phone { state: s } => state.phone_state = *s,
        EventPayload::Headset { state: s } => state.headset_state = *s,
        EventPayload::Dock { state: s } => state.dock_state = *s,
        EventPayload::Network {
            network_type,
            connection_state,
        } => {
            state.network_state.network_type = *network_type;
            state.network_state.connection_state = *connection_state;
        }
        EventPayload::NetworkTypeChange { network_type } => {
            state.network_state.network_type = *network_type;
        }
        EventPayload::NetworkStatusChange { connection_state } => {
            state.network_state.connection_state = *connection_state;
        }
        EventPayload::Battery {
            level,
            temperature,
            status,
            plug_state,
        } => {
            state.battery_state.level = *level;
            state.battery_state.temperature = *temperature;
            state.battery_state.status = *status;
            state.battery_state.plug_state = *plug_state;
        }
        EventPayload::BatteryLevel { level } => state.battery_state.level = Some(*level),
        EventPayload::BatteryTemperature { temperature } => {
            state.battery_state.temperature = Some(*temperature)
        }
        EventPayload::BatteryStatus { status } => state.battery_state.status = *status,
        EventPayload::BatteryPlugStatus { plug_state } => state.battery_state.plug_state = *plug_state,
        EventPayload::BatteryEnergyState { energy_state } => {
            state.battery_state.energy_state = *energy_state
        }
        _ => {}
    }
}

/// Context handed to a module during `build`/`handle_event`/
/// `handle_alarm`, scoping it to the engine facilities it is allowed
/// to use: posting events, registering alarms, and reading (never
/// writing) shared device state.
pub struct SimContext<'a> {
    sim: &'a mut Simulator,
    module_id: usize,
}

impl<'a> SimContext<'a> {
    pub fn now(&self) -> Timestamp {
        self.sim.current_time()
    }

    pub fn device_state(&self) -> &DeviceState {
        self.sim.device_state()
    }

    /// Subscribe this module to an event type, with an optional
    /// filter predicate.
    pub fn subscribe(
        &mut self,
        event_type: uamp_sim_common::EventType,
        filter: Option<Box<dyn Fn(&Event) -> bool>>,
    ) {
        self.sim.subscribe(self.module_id, event_type, filter);
    }

    /// Broadcast an event at the current simulated time.
    pub fn broadcast(&mut self, payload: uamp_sim_common::EventPayload) -> Result<(), SimError> {
        let event = Event::new(self.now(), payload);
        self.sim.broadcast(&event)
    }

    /// Register an alarm for this module, optionally periodic.
    pub fn register_alarm(
        &mut self,
        alarm_name: impl Into<String>,
        period: Option<Duration>,
    ) -> AlarmHandle {
        self.sim.register_module_alarm(self.module_id, alarm_name.into(), period)
    }

    pub fn has_module_instance(&self, name: &str) -> bool {
        self.sim.has_module_instance(name)
    }

    pub fn get_module_for_type(&self, module_type: SimModuleType) -> Option<&dyn SimModule> {
        self.sim.get_module_for_type(module_type)
    }
}
