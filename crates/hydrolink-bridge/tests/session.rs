//! End-to-end session over loopback TCP: a scripted simulator double on the
//! command channel plus a frame publisher on the telemetry channel.

use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use hydrolink_bridge::framing::{read_text, write_part, write_text};
use hydrolink_bridge::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Command-channel double. Answers scripted responses until `EXIT`, which it
/// acknowledges with `EXIT OK`. Returns every command it received.
fn spawn_simulator(responses: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut received = Vec::new();
        let mut script = responses.into_iter();
        loop {
            let Ok(command) = read_text(&mut stream) else {
                break;
            };
            let is_exit = command == EXIT_COMMAND;
            received.push(command);
            if is_exit {
                write_text(&mut stream, "EXIT OK").unwrap();
                break;
            }
            write_text(&mut stream, script.next().unwrap_or("[]")).unwrap();
        }
        received
    });
    (addr, handle)
}

/// Telemetry-channel double. Waits for a subscriber, then sends the given
/// frames back-to-back and holds the connection open until told to quit.
fn spawn_publisher(
    frames: Vec<(i32, &'static str, Vec<u8>)>,
) -> (String, mpsc::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (quit_tx, quit_rx) = mpsc::channel::<()>();
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        for (id, title, payload) in frames {
            publish_frame(&mut stream, id, title, &payload);
        }
        let _ = quit_rx.recv();
    });
    (addr, quit_tx, handle)
}

fn publish_frame(stream: &mut TcpStream, id: i32, title: &str, payload: &[u8]) {
    write_part(stream, &id.to_le_bytes()).unwrap();
    write_part(stream, title.as_bytes()).unwrap();
    write_part(stream, payload).unwrap();
}

fn f32_vec_payload(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn full_episode_step_reset_close() {
    init_tracing();
    let (addr, sim) = spawn_simulator(vec!["[0.0, 0.0, 5.0]", "[0.1, 0.2, 4.9]"]);

    let actuators = vec![
        ActuatorSpec::new("t1", ActionKind::Torque),
        ActuatorSpec::new("t2", ActionKind::Torque),
    ];
    let observations = vec![
        ObservationSpec::new("surge"),
        ObservationSpec::new("sway"),
        ObservationSpec::new("depth"),
    ];
    let mut bridge = SimulatorBridge::connect(&addr, actuators, observations).unwrap();

    let poses = [ResetPose::new("girona500", [0.0, 0.0, 5.0], [0.0; 3])];
    let obs = bridge.reset(&poses).unwrap();
    assert_eq!(obs, vec![0.0, 0.0, 5.0]);

    let obs = bridge.step(&[0.5, -0.5]).unwrap();
    assert_eq!(obs, vec![0.1, 0.2, 4.9]);
    assert_eq!(bridge.last_observation(), &[0.1, 0.2, 4.9]);

    bridge.close();
    assert!(bridge.is_closed());

    let received = sim.join().unwrap();
    assert_eq!(received.len(), 3);
    assert!(received[0].starts_with("RESET:["));
    assert_eq!(received[1], "CMD:t1:TORQUE:0.5;t2:TORQUE:-0.5;OBS:");
    assert_eq!(received[2], "EXIT");
}

#[test]
fn corrupt_response_falls_back_to_telemetry() {
    init_tracing();
    let (sim_addr, sim) = spawn_simulator(vec!["garbage, not json"]);
    let (pub_addr, quit, publisher) =
        spawn_publisher(vec![(7, "obs", f32_vec_payload(&[1.0, 2.0, 3.0]))]);

    let receiver = TelemetryReceiver::connect(&pub_addr).unwrap();
    let mut bridge = SimulatorBridge::connect(
        &sim_addr,
        vec![ActuatorSpec::new("t1", ActionKind::Torque)],
        vec![
            ObservationSpec::new("a"),
            ObservationSpec::new("b"),
            ObservationSpec::new("c"),
        ],
    )
    .unwrap()
    .with_receiver(receiver);
    bridge.set_poll_timeout(Duration::from_millis(500));

    let obs = bridge.step(&[0.25]).unwrap();
    assert_eq!(obs, vec![1.0, 2.0, 3.0]);

    bridge.close();
    quit.send(()).unwrap();
    sim.join().unwrap();
    publisher.join().unwrap();
}

#[test]
fn telemetry_polling_alongside_a_session() {
    init_tracing();
    let (pub_addr, quit, publisher) = spawn_publisher(vec![
        (1, "depth", 4.5f32.to_le_bytes().to_vec()),
        (2, "docked", vec![0x01]),
        (3, "labels", b"t1|t2".to_vec()),
    ]);

    let mut receiver = TelemetryReceiver::connect(&pub_addr).unwrap();
    let timeout = Duration::from_millis(500);

    let first = receiver.poll_once(timeout).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(first.title, "depth");
    assert_eq!(first.value, FrameValue::Float(4.5));
    assert_eq!(first.tag(), TypeTag::Float);

    assert_eq!(receiver.poll_once(timeout).unwrap().value, FrameValue::Bool(true));
    assert_eq!(
        receiver.poll_once(timeout).unwrap().value,
        FrameValue::TextVec(vec!["t1".into(), "t2".into()])
    );

    // Publisher idle now: a bounded poll comes back empty, not hung.
    assert!(receiver.poll_once(Duration::from_millis(50)).is_none());

    receiver.stop();
    quit.send(()).unwrap();
    publisher.join().unwrap();
}

#[test]
fn streaming_stops_on_handle_and_session_survives() {
    init_tracing();
    let (sim_addr, sim) = spawn_simulator(vec!["[1.0]"]);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let pub_addr = listener.local_addr().unwrap().to_string();
    let mut receiver = TelemetryReceiver::connect(&pub_addr).unwrap();
    let handle = receiver.stop_handle();

    let publisher = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        for i in 0..100i32 {
            // Hang-ups end publishing.
            if write_part(&mut stream, &i.to_le_bytes()).is_err()
                || write_part(&mut stream, b"tick").is_err()
                || write_part(&mut stream, &0.5f32.to_le_bytes()).is_err()
            {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    });

    let mut seen = 0u32;
    receiver.stream_forever(|frame| {
        assert_eq!(frame.title, "tick");
        seen += 1;
        if seen == 5 {
            handle.stop();
        }
    });
    assert!(seen >= 5);
    assert!(!receiver.is_running());
    publisher.join().unwrap();

    // The command channel is unaffected by telemetry shutdown.
    let mut bridge = SimulatorBridge::connect(
        &sim_addr,
        vec![ActuatorSpec::new("t1", ActionKind::Setpoint)],
        vec![ObservationSpec::new("x")],
    )
    .unwrap();
    assert_eq!(bridge.step(&[0.0]).unwrap(), vec![1.0]);
    bridge.close();
    sim.join().unwrap();
}

#[test]
fn structured_episode_with_missing_sensor_readings() {
    init_tracing();
    let (addr, sim) = spawn_simulator(vec![
        r#"{"girona500": {"depth": 4.5, "dvl": null}}"#,
        r#"{"girona500": {"depth": 4.4, "dvl": [0.1, 0.2, 0.3]}}"#,
    ]);

    let mut bridge = SimulatorBridge::connect(
        &addr,
        vec![ActuatorSpec::new("t1", ActionKind::Torque)],
        vec![ObservationSpec::new("depth")],
    )
    .unwrap();

    let state = bridge.step_structured(&[0.1]).unwrap();
    let robot = state.get("girona500").unwrap();
    assert!(robot.get("dvl").unwrap().as_number().unwrap().is_nan());
    assert!(state.contains_nan());

    let state = bridge.step_structured(&[0.1]).unwrap();
    assert!(!state.contains_nan());

    bridge.close();
    sim.join().unwrap();
}
