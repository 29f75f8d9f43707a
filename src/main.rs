//! Office sensing node — host entry point.
//!
//! Builds the whole node once at startup and passes references inward; no
//! component reaches outside what it is given.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                      │
//! │                                                               │
//! │  SimI2cBus   SimAdc/SimInputPin   SimNetLink    SimBroker     │
//! │  (AHT10 bus) (light / flame)      (station)     (pub/sub)     │
//! │  HostClock   HostDelay                                        │
//! │                                                               │
//! │  ─────────────────── Port boundary ─────────────────────      │
//! │                                                               │
//! │  ConnectivityManager · TickScheduler · CommandRouter          │
//! │  fire-alarm / reporter / heartbeat duties                     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! One cooperative loop drives everything: ensure link → ensure session →
//! drain inbound → tick duties → fixed idle sleep. No condition is fatal;
//! the loop degrades to fewer successful reads/publishes and keeps going
//! until the process is terminated externally.

#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use env_logger::Env;
use log::{info, warn};

use officenode::adapters::host_time::{HostClock, HostDelay};
use officenode::adapters::sim::{SimAdc, SimBroker, SimI2cBus, SimInputPin, SimNetLink, SimOutputPin};
use officenode::app::router::CommandRouter;
use officenode::clock::Monotonic;
use officenode::config::{NodeConfig, TuningParams, TOPIC_CONFIG_UPDATE, TOPIC_CONTROL_CMD};
use officenode::drivers::buzzer::Buzzer;
use officenode::drivers::rgb_led::RgbLed;
use officenode::error;
use officenode::modules::fire_alarm::FireAlarmModule;
use officenode::modules::heartbeat::HeartbeatModule;
use officenode::modules::reporter::ReporterModule;
use officenode::net::ConnectivityManager;
use officenode::scheduler::{TaskRunner, TickScheduler};
use officenode::sensors::aht10::Aht10;
use officenode::sensors::flame::FlameSensor;
use officenode::sensors::light::LightSensor;

// ── Duty identifiers ──────────────────────────────────────────
//
// Registration order is the node's fixed priority order: the hazard check
// runs before routine telemetry, which runs before housekeeping, so within
// one iteration the later duties observe the connectivity state the
// earlier ones left behind.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskId {
    FireAlarm,
    Reporter,
    Heartbeat,
}

// ── Task dispatch context ─────────────────────────────────────
//
// Borrows everything a duty might need for the duration of one scheduler
// tick. The scheduler calls back through `TaskRunner`; this is the
// designated boundary where duty failures are caught and logged.

struct NodeTasks<'a> {
    fire_alarm: &'a mut FireAlarmModule,
    reporter: &'a mut ReporterModule,
    heartbeat: &'a mut HeartbeatModule,
    flame: &'a mut FlameSensor<SimInputPin>,
    light: &'a mut LightSensor<SimAdc>,
    env: &'a mut Aht10<SimI2cBus, HostDelay>,
    led: &'a mut RgbLed<SimOutputPin, HostDelay>,
    buzzer: &'a mut Buzzer<SimOutputPin, HostDelay>,
    net: &'a mut ConnectivityManager<SimNetLink, SimBroker, HostDelay>,
    device_id: &'a str,
    now: u32,
}

impl TaskRunner<TaskId> for NodeTasks<'_> {
    fn run_task(&mut self, id: TaskId) -> error::Result<()> {
        match id {
            TaskId::FireAlarm => self.fire_alarm.run(
                self.flame,
                self.led,
                self.buzzer,
                self.net,
                self.device_id,
                self.now,
            ),
            TaskId::Reporter => self.reporter.run(
                self.light,
                self.env,
                self.flame,
                self.led,
                self.net,
                self.device_id,
                self.now,
            ),
            TaskId::Heartbeat => self.heartbeat.run(self.net, self.device_id, self.now),
        }
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = NodeConfig::default();
    let mut params = TuningParams {
        data_collect_interval_ms: config.sensor_report_period_ms,
    };

    info!("office node '{}' starting", config.device_id);

    // ── Simulated peripherals ─────────────────────────────────
    let clock = HostClock::new();
    let mut env = Aht10::new(SimI2cBus::new(23.0, 42.0), HostDelay);
    let mut light = LightSensor::new(SimAdc::new(9_500));
    let mut flame = FlameSensor::new(SimInputPin::new(false));
    let mut led = RgbLed::new(
        SimOutputPin::new(),
        SimOutputPin::new(),
        SimOutputPin::new(),
        HostDelay,
    );
    let mut buzzer = Buzzer::new(SimOutputPin::new(), HostDelay);
    if let Err(e) = led.off() {
        warn!("LED init: {e}");
    }
    if let Err(e) = buzzer.off() {
        warn!("buzzer init: {e}");
    }

    // The bus settle delays make this the slow part of boot.
    if let Err(e) = env.initialize() {
        warn!("AHT10 init failed ({e}), first reads will re-initialise");
    }

    // ── Connectivity ──────────────────────────────────────────
    let mut net = ConnectivityManager::new(
        SimNetLink::new(&config.wifi_ssid, &config.wifi_password),
        SimBroker::new(
            &config.device_id,
            &config.broker_host,
            config.broker_port,
            config.keepalive_secs,
        ),
        HostDelay,
        &config,
    );
    // Recorded now, replayed once a session is up — start-up order does
    // not matter.
    net.subscribe(TOPIC_CONTROL_CMD)?;
    net.subscribe(TOPIC_CONFIG_UPDATE)?;

    // ── Duties ────────────────────────────────────────────────
    let mut fire_alarm = FireAlarmModule::new();
    let mut reporter = ReporterModule::new();
    let mut heartbeat = HeartbeatModule::new(clock.now_ms());
    let router = CommandRouter::new(&config.device_id);

    let mut sched = TickScheduler::new();
    sched.register(TaskId::FireAlarm, "fire-alarm", config.fire_alarm_period_ms);
    sched.register(TaskId::Reporter, "reporter", config.sensor_report_period_ms);
    sched.register(TaskId::Heartbeat, "heartbeat", config.heartbeat_period_ms);

    info!("node ready, entering control loop");

    // ── Control loop ──────────────────────────────────────────
    let mut idle = HostDelay;
    loop {
        if !net.ensure_link() {
            warn!("link down, retrying");
            idle.delay_ms(config.idle_sleep_ms);
            continue;
        }
        if !net.ensure_session() {
            warn!("session down, retrying");
            idle.delay_ms(config.idle_sleep_ms);
            continue;
        }

        // Pump inbound messages into the router.
        while let Some(msg) = net.poll() {
            router.dispatch(&msg, &mut led, &mut buzzer, &mut params);
        }

        // Config changes take effect on the next cycle, not mid-cycle.
        sched.set_period(TaskId::Reporter, params.data_collect_interval_ms);

        let now = clock.now_ms();
        let mut tasks = NodeTasks {
            fire_alarm: &mut fire_alarm,
            reporter: &mut reporter,
            heartbeat: &mut heartbeat,
            flame: &mut flame,
            light: &mut light,
            env: &mut env,
            led: &mut led,
            buzzer: &mut buzzer,
            net: &mut net,
            device_id: &config.device_id,
            now,
        };
        sched.tick(now, &mut tasks);

        idle.delay_ms(config.idle_sleep_ms);
    }
}
