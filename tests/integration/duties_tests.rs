//! Duty-level behaviour: alarm edge semantics and telemetry composition.

use std::cell::RefCell;
use std::rc::Rc;

use crate::mock_env::{published_on, BrokerState, CountingPin, MockBroker, MockLink, NoopDelay};
use officenode::adapters::sim::{SimAdc, SimI2cBus, SimInputPin};
use officenode::config::{NodeConfig, TOPIC_ALARM, TOPIC_SENSOR_DATA};
use officenode::drivers::buzzer::Buzzer;
use officenode::drivers::rgb_led::RgbLed;
use officenode::modules::fire_alarm::FireAlarmModule;
use officenode::modules::reporter::ReporterModule;
use officenode::net::ConnectivityManager;
use officenode::sensors::aht10::Aht10;
use officenode::sensors::flame::FlameSensor;
use officenode::sensors::light::LightSensor;

fn net_up() -> (
    ConnectivityManager<MockLink, MockBroker, NoopDelay>,
    Rc<RefCell<BrokerState>>,
) {
    let (link, _up) = MockLink::new();
    let (broker, state) = MockBroker::new();
    let mut net = ConnectivityManager::new(link, broker, NoopDelay, &NodeConfig::default());
    assert!(net.ensure_session());
    (net, state)
}

fn dark_led() -> RgbLed<CountingPin, NoopDelay> {
    RgbLed::new(CountingPin::new(), CountingPin::new(), CountingPin::new(), NoopDelay)
}

#[test]
fn alarm_fires_on_rising_edges_only() {
    let (mut net, state) = net_up();

    let flame_pin = SimInputPin::new(false);
    let flame_handle = flame_pin.handle();
    let mut flame = FlameSensor::new(flame_pin);

    let red = CountingPin::new();
    let red_on_events = red.lows_handle();
    let mut led = RgbLed::new(red, CountingPin::new(), CountingPin::new(), NoopDelay);

    let buzzer_pin = CountingPin::new();
    let beep_events = buzzer_pin.highs_handle();
    let mut buzzer = Buzzer::new(buzzer_pin, NoopDelay);

    let mut alarm = FireAlarmModule::new();

    for (i, present) in [false, true, true, false, true].into_iter().enumerate() {
        flame_handle.set(present);
        alarm
            .run(&mut flame, &mut led, &mut buzzer, &mut net, "W601_001", i as u32 * 1_000)
            .unwrap();
    }

    // Two rising edges → exactly two alarm events, nothing on hazard-clear.
    let alarms = published_on(&state, TOPIC_ALARM);
    assert_eq!(alarms.len(), 2);

    // Local indication repeats on every cycle where the hazard is present.
    assert_eq!(red_on_events.get(), 3);
    assert_eq!(beep_events.get(), 3);

    let v: serde_json::Value = serde_json::from_slice(&alarms[0]).unwrap();
    assert_eq!(v["deviceId"], "W601_001");
    assert_eq!(v["alarmType"], "FIRE");
    assert_eq!(v["level"], "CRITICAL");
    assert_eq!(v["timestamp"], 1_000);
}

#[test]
fn light_failure_yields_sentinel_and_publication_still_occurs() {
    let (mut net, state) = net_up();

    let adc = SimAdc::new(9_500);
    adc.fail_handle().set(true);
    let mut light = LightSensor::new(adc);

    let mut env = Aht10::new(SimI2cBus::new(25.0, 50.0), NoopDelay);
    env.initialize().unwrap();
    let mut flame = FlameSensor::new(SimInputPin::new(false));
    let led = dark_led();

    let mut reporter = ReporterModule::new();
    reporter
        .run(&mut light, &mut env, &mut flame, &led, &mut net, "W601_001", 10_000)
        .unwrap();

    let reports = published_on(&state, TOPIC_SENSOR_DATA);
    assert_eq!(reports.len(), 1);
    let v: serde_json::Value = serde_json::from_slice(&reports[0]).unwrap();

    assert_eq!(v["light"], 0.0);
    let t = v["temperature"].as_f64().unwrap();
    let h = v["humidity"].as_f64().unwrap();
    assert!((t - 25.0).abs() < 1.0, "temperature {t}");
    assert!((h - 50.0).abs() < 1.0, "humidity {h}");
    assert_eq!(v["flame"], false);
    assert_eq!(v["rgbStatus"], false);
    assert_eq!(v["timestamp"], 10_000);
}

#[test]
fn environment_failure_zeroes_both_fields_others_survive() {
    let (mut net, state) = net_up();

    let mut light = LightSensor::new(SimAdc::new(9_500));

    let bus = SimI2cBus::new(25.0, 50.0);
    let bus_fail = bus.fail_handle();
    let mut env = Aht10::new(bus, NoopDelay);
    env.initialize().unwrap();
    bus_fail.set(true);

    let flame_pin = SimInputPin::new(true);
    let mut flame = FlameSensor::new(flame_pin);
    let mut led = dark_led();
    led.white().unwrap();

    let mut reporter = ReporterModule::new();
    reporter
        .run(&mut light, &mut env, &mut flame, &led, &mut net, "W601_001", 20_000)
        .unwrap();

    let reports = published_on(&state, TOPIC_SENSOR_DATA);
    let v: serde_json::Value = serde_json::from_slice(&reports[0]).unwrap();
    assert_eq!(v["temperature"], 0.0);
    assert_eq!(v["humidity"], 0.0);
    assert!(v["light"].as_f64().unwrap() > 0.0);
    assert_eq!(v["flame"], true);
    assert_eq!(v["rgbStatus"], true);
}

/// Input pin whose reads can be made to fail on demand.
struct FlakyPin {
    low: Rc<std::cell::Cell<bool>>,
    fail: Rc<std::cell::Cell<bool>>,
}

#[derive(Debug)]
struct FlakyPinError;
impl embedded_hal::digital::Error for FlakyPinError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl embedded_hal::digital::ErrorType for FlakyPin {
    type Error = FlakyPinError;
}

impl embedded_hal::digital::InputPin for FlakyPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|l| !l)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        if self.fail.get() {
            return Err(FlakyPinError);
        }
        Ok(self.low.get())
    }
}

#[test]
fn flame_read_failure_is_treated_as_clear() {
    let (mut net, state) = net_up();

    let low = Rc::new(std::cell::Cell::new(false));
    let fail = Rc::new(std::cell::Cell::new(false));
    let mut flame = FlameSensor::new(FlakyPin {
        low: Rc::clone(&low),
        fail: Rc::clone(&fail),
    });

    let red = CountingPin::new();
    let red_on_events = red.lows_handle();
    let mut led = RgbLed::new(red, CountingPin::new(), CountingPin::new(), NoopDelay);
    let mut buzzer = Buzzer::new(CountingPin::new(), NoopDelay);
    let mut alarm = FireAlarmModule::new();

    // Rising edge raises one alarm.
    low.set(true);
    alarm.run(&mut flame, &mut led, &mut buzzer, &mut net, "W601_001", 0).unwrap();
    // A read failure counts as clear: no alarm, no indication — and it
    // silently rearms the edge detector.
    fail.set(true);
    alarm.run(&mut flame, &mut led, &mut buzzer, &mut net, "W601_001", 1_000).unwrap();
    assert_eq!(red_on_events.get(), 1);
    // Recovered reading raises a fresh rising edge.
    fail.set(false);
    alarm.run(&mut flame, &mut led, &mut buzzer, &mut net, "W601_001", 2_000).unwrap();

    assert_eq!(published_on(&state, TOPIC_ALARM).len(), 2);
}
