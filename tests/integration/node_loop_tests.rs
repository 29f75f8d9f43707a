//! Whole-node behaviour: the cooperative loop wired exactly like the
//! binary, against the mock network and simulated peripherals, driven with
//! synthetic time.

use core::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use crate::mock_env::{
    published_on, push_inbound, BrokerState, CountingPin, MockBroker, MockLink, NoopDelay,
};
use officenode::adapters::sim::{SimAdc, SimI2cBus, SimInputPin};
use officenode::app::router::CommandRouter;
use officenode::config::{
    NodeConfig, TuningParams, TOPIC_CONFIG_UPDATE, TOPIC_CONTROL_CMD, TOPIC_DEVICE_STATUS,
    TOPIC_SENSOR_DATA,
};
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskId {
    FireAlarm,
    Reporter,
    Heartbeat,
}

struct Tasks<'a> {
    fire_alarm: &'a mut FireAlarmModule,
    reporter: &'a mut ReporterModule,
    heartbeat: &'a mut HeartbeatModule,
    flame: &'a mut FlameSensor<SimInputPin>,
    light: &'a mut LightSensor<SimAdc>,
    env: &'a mut Aht10<SimI2cBus, NoopDelay>,
    led: &'a mut RgbLed<CountingPin, NoopDelay>,
    buzzer: &'a mut Buzzer<CountingPin, NoopDelay>,
    net: &'a mut ConnectivityManager<MockLink, MockBroker, NoopDelay>,
    device_id: &'a str,
    now: u32,
}

impl TaskRunner<TaskId> for Tasks<'_> {
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

/// The node, assembled like the binary but over test doubles.
struct Node {
    config: NodeConfig,
    params: TuningParams,
    sched: TickScheduler<TaskId>,
    router: CommandRouter,
    fire_alarm: FireAlarmModule,
    reporter: ReporterModule,
    heartbeat: HeartbeatModule,
    flame: FlameSensor<SimInputPin>,
    flame_handle: Rc<Cell<bool>>,
    light: LightSensor<SimAdc>,
    env: Aht10<SimI2cBus, NoopDelay>,
    led: RgbLed<CountingPin, NoopDelay>,
    buzzer: Buzzer<CountingPin, NoopDelay>,
    net: ConnectivityManager<MockLink, MockBroker, NoopDelay>,
    now: u32,
}

impl Node {
    fn new() -> (Self, Rc<RefCell<BrokerState>>, Rc<Cell<bool>>) {
        let config = NodeConfig::default();
        let params = TuningParams::default();

        let (link, link_up) = MockLink::new();
        let (broker, state) = MockBroker::new();
        let mut net = ConnectivityManager::new(link, broker, NoopDelay, &config);
        net.subscribe(TOPIC_CONTROL_CMD).unwrap();
        net.subscribe(TOPIC_CONFIG_UPDATE).unwrap();

        let flame_pin = SimInputPin::new(false);
        let flame_handle = flame_pin.handle();
        let mut env = Aht10::new(SimI2cBus::new(22.0, 40.0), NoopDelay);
        env.initialize().unwrap();

        let mut sched = TickScheduler::new();
        sched.register(TaskId::FireAlarm, "fire-alarm", config.fire_alarm_period_ms);
        sched.register(TaskId::Reporter, "reporter", config.sensor_report_period_ms);
        sched.register(TaskId::Heartbeat, "heartbeat", config.heartbeat_period_ms);

        let router = CommandRouter::new(&config.device_id);
        let node = Self {
            params,
            sched,
            router,
            fire_alarm: FireAlarmModule::new(),
            reporter: ReporterModule::new(),
            heartbeat: HeartbeatModule::new(0),
            flame: FlameSensor::new(flame_pin),
            flame_handle,
            light: LightSensor::new(SimAdc::new(9_500)),
            env,
            led: RgbLed::new(CountingPin::new(), CountingPin::new(), CountingPin::new(), NoopDelay),
            buzzer: Buzzer::new(CountingPin::new(), NoopDelay),
            net,
            now: 0,
            config,
        };
        (node, state, link_up)
    }

    /// One control-loop iteration at the current synthetic time.
    fn iterate(&mut self) {
        if !self.net.ensure_link() {
            return;
        }
        if !self.net.ensure_session() {
            return;
        }
        while let Some(msg) = self.net.poll() {
            self.router
                .dispatch(&msg, &mut self.led, &mut self.buzzer, &mut self.params);
        }
        self.sched
            .set_period(TaskId::Reporter, self.params.data_collect_interval_ms);

        let mut tasks = Tasks {
            fire_alarm: &mut self.fire_alarm,
            reporter: &mut self.reporter,
            heartbeat: &mut self.heartbeat,
            flame: &mut self.flame,
            light: &mut self.light,
            env: &mut self.env,
            led: &mut self.led,
            buzzer: &mut self.buzzer,
            net: &mut self.net,
            device_id: &self.config.device_id,
            now: self.now,
        };
        self.sched.tick(self.now, &mut tasks);
    }

    /// Advance synthetic time by `step_ms` per iteration.
    fn advance(&mut self, iterations: u32, step_ms: u32) {
        for _ in 0..iterations {
            self.now = self.now.wrapping_add(step_ms);
            self.iterate();
        }
    }
}

#[test]
fn duty_cadence_over_a_minute() {
    let (mut node, state, _link) = Node::new();
    node.advance(610, 100); // 61 s of simulated time, 100 ms loop

    // Reporter every 10 s, heartbeat every 30 s.
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 6);
    assert_eq!(published_on(&state, TOPIC_DEVICE_STATUS).len(), 2);
}

#[test]
fn heartbeat_reports_online_with_address_and_uptime() {
    let (mut node, state, _link) = Node::new();
    node.advance(300, 100); // 30 s

    let beats = published_on(&state, TOPIC_DEVICE_STATUS);
    assert_eq!(beats.len(), 1);
    let v: serde_json::Value = serde_json::from_slice(&beats[0]).unwrap();
    assert_eq!(v["status"], "ONLINE");
    assert_eq!(v["ip"], "10.0.0.7");
    assert_eq!(v["uptimeMs"], 30_000);
    assert_eq!(v["timestamp"], 30_000);
}

#[test]
fn startup_subscriptions_replay_once_in_order() {
    let (mut node, state, _link) = Node::new();
    // Duplicate intent before the first session — must not double on the wire.
    node.net.subscribe(TOPIC_CONTROL_CMD).unwrap();

    node.advance(1, 100);
    assert_eq!(
        state.borrow().wire_subscribes,
        vec![TOPIC_CONTROL_CMD.to_string(), TOPIC_CONFIG_UPDATE.to_string()]
    );
}

#[test]
fn control_commands_are_filtered_by_device_identity() {
    let (mut node, state, _link) = Node::new();

    push_inbound(&state, TOPIC_CONTROL_CMD, r#"{"deviceId":"W601_999","action":"rgb_on"}"#);
    node.advance(1, 100);
    assert!(!node.led.is_on());

    push_inbound(&state, TOPIC_CONTROL_CMD, r#"{"deviceId":"W601_001","action":"rgb_on"}"#);
    node.advance(1, 100);
    assert!(node.led.is_on());

    push_inbound(&state, TOPIC_CONTROL_CMD, r#"{"deviceId":"W601_001","action":"rgb_off"}"#);
    node.advance(1, 100);
    assert!(!node.led.is_on());
}

#[test]
fn config_retune_applies_from_the_next_cycle() {
    let (mut node, state, _link) = Node::new();
    node.advance(100, 100); // 10 s → first report
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 1);

    push_inbound(&state, TOPIC_CONFIG_UPDATE, r#"{"data.collect.interval":2}"#);
    node.advance(100, 100); // next 10 s at a 2 s period → five more
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 6);
}

#[test]
fn publish_failure_demotes_session_then_loop_recovers() {
    let (mut node, state, _link) = Node::new();
    node.advance(99, 100); // 9.9 s — nothing due yet
    assert_eq!(state.borrow().connect_calls, 1);

    state.borrow_mut().fail_next_publish = true;
    node.advance(1, 100); // 10 s: reporter fires, publish fails, session drops
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 0);
    assert!(!node.net.is_session_up());

    // Next iteration re-establishes the session and replays subscriptions;
    // the failed duty itself is not retried until its own next period.
    node.advance(99, 100); // up to 19.9 s
    assert_eq!(state.borrow().connect_calls, 2);
    assert_eq!(state.borrow().wire_subscribes.len(), 4);
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 0);

    node.advance(1, 100); // 20 s: the next scheduled report succeeds
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 1);
}

#[test]
fn link_loss_pauses_duties_until_recovery() {
    let (mut node, state, link) = Node::new();
    node.advance(100, 100); // first report out
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 1);

    link.set(false);
    node.advance(200, 100); // 20 s with the link down — loop skips duties
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 1);

    link.set(true);
    node.advance(1, 100); // overdue report goes out immediately
    assert_eq!(published_on(&state, TOPIC_SENSOR_DATA).len(), 2);
}

#[test]
fn flame_during_loop_raises_alarm_and_telemetry_reflects_it() {
    let (mut node, state, _link) = Node::new();
    node.flame_handle.set(true);
    node.advance(15, 100); // 1.5 s: one hazard evaluation at 1 s

    let alarms = published_on(&state, officenode::config::TOPIC_ALARM);
    assert_eq!(alarms.len(), 1);

    node.advance(95, 100); // reach the 10 s report
    let reports = published_on(&state, TOPIC_SENSOR_DATA);
    assert_eq!(reports.len(), 1);
    let v: serde_json::Value = serde_json::from_slice(&reports[0]).unwrap();
    assert_eq!(v["flame"], true);
}
