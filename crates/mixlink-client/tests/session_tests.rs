//! Session tests against a loopback stand-in for the device

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc::Receiver;
use tokio::time::timeout;

use mixlink_client::{
    Action, ConnectionStatus, DeviceConfig, DeviceEvent, GainStep, MuteMode, Session,
};
use mixlink_core::codec::{decode_packet, OscMessage, OscPacket};
use mixlink_core::{encode_message, OscArg};

const WAIT: Duration = Duration::from_secs(5);

struct FakeDevice {
    socket: UdpSocket,
}

impl FakeDevice {
    async fn bind() -> Self {
        let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind device");
        Self { socket }
    }

    fn addr(&self) -> SocketAddr {
        self.socket.local_addr().expect("device addr")
    }

    /// Receive one OSC message sent by the adapter
    async fn recv_message(&self) -> OscMessage {
        let mut buf = vec![0u8; 2048];
        let (len, _) = timeout(WAIT, self.socket.recv_from(&mut buf))
            .await
            .expect("timed out waiting for a command")
            .expect("device recv");
        match decode_packet(&buf[..len]).expect("decode command") {
            OscPacket::Message(m) => m,
            OscPacket::Bundle(_) => panic!("adapter never sends bundles"),
        }
    }

    /// Receive messages until one matches the address
    async fn recv_until(&self, addr: &str) -> OscMessage {
        loop {
            let msg = self.recv_message().await;
            if msg.addr == addr {
                return msg;
            }
        }
    }

    /// Emit an unsolicited state report to the adapter's feedback port
    async fn send_report(&self, to: SocketAddr, addr: &str, args: &[OscArg]) {
        let bytes = encode_message(addr, args).expect("encode report");
        self.socket.send_to(&bytes, to).await.expect("device send");
    }
}

async fn wait_status(events: &mut Receiver<DeviceEvent>, want: ConnectionStatus) {
    loop {
        match timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for status")
            .expect("event stream closed")
        {
            DeviceEvent::Status { status, .. } if status == want => return,
            _ => {}
        }
    }
}

async fn wait_variable(events: &mut Receiver<DeviceEvent>, want_id: &str) -> String {
    loop {
        match timeout(WAIT, events.recv())
            .await
            .expect("timed out waiting for variable")
            .expect("event stream closed")
        {
            DeviceEvent::Variable { id, value } if id == want_id => return value,
            _ => {}
        }
    }
}

async fn start_session(device: &FakeDevice) -> (Session, Receiver<DeviceEvent>) {
    let config = DeviceConfig {
        host: "127.0.0.1".to_string(),
        device_name: "unit1".to_string(),
        target_port: device.addr().port(),
        feedback_port: 0,
    };
    let (session, mut events) = Session::start(config);
    wait_status(&mut events, ConnectionStatus::Connected).await;
    assert!(session.local_addr().is_some());
    (session, events)
}

#[tokio::test]
async fn test_connect_then_one_shot_sync() {
    let device = FakeDevice::bind().await;
    let (session, _events) = start_session(&device).await;
    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(session.label(), "unit1");

    // the full-state request follows after the settle delay, exactly once
    let sync = device.recv_until("/sync/unit1").await;
    assert!(sync.args.is_empty());
}

#[tokio::test]
async fn test_ping_probe_on_demand() {
    let device = FakeDevice::bind().await;
    let (session, _events) = start_session(&device).await;

    session.ping().await;
    let ping = device.recv_until("/ping/unit1").await;
    assert!(ping.args.is_empty());
}

#[tokio::test]
async fn test_set_crosspoint_gain_clamps_and_sends() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;

    session.set_crosspoint_gain(1, 1, -150.0).await.unwrap();

    let cmd = device.recv_until("/gain/input/1/1/unit1").await;
    assert_eq!(cmd.args, vec![OscArg::Float(-120.0)]);

    let value = wait_variable(&mut events, "gain_input_1_1").await;
    assert_eq!(value, "-120.0");
    assert_eq!(session.variable("gain_input_1_1").as_deref(), Some("-120.0"));
}

#[tokio::test]
async fn test_step_gain_from_reported_state() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    device
        .send_report(feedback, "/gain/input/1/1/unit1", &[OscArg::Float(-2.0)])
        .await;
    assert_eq!(wait_variable(&mut events, "gain_input_1_1").await, "-2.0");

    session
        .step_crosspoint_gain(1, 1, GainStep::Down3)
        .await
        .unwrap();
    assert_eq!(wait_variable(&mut events, "gain_input_1_1").await, "-5.0");

    // near the floor the step clamps
    device
        .send_report(feedback, "/gain/output/2/unit1", &[OscArg::Float(-119.0)])
        .await;
    assert_eq!(wait_variable(&mut events, "gain_output_2").await, "-119.0");

    session.step_output_gain(2, GainStep::Down3).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_output_2").await, "-120.0");
}

#[tokio::test]
async fn test_step_gain_without_state_starts_at_zero() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;

    session.step_output_gain(3, GainStep::Up3).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_output_3").await, "3.0");
}

#[tokio::test]
async fn test_crosspoint_mute_toggle_cycle() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    device
        .send_report(feedback, "/gain/input/1/1/unit1", &[OscArg::Float(-2.0)])
        .await;
    wait_variable(&mut events, "gain_input_1_1").await;

    // mute: drops to the floor, remembers -2.0
    session.toggle_crosspoint_mute(1, 1).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_input_1_1").await, "-120.0");
    assert!(session.crosspoint_muted(1, 1));

    // unmute: restores exactly the remembered level
    session.toggle_crosspoint_mute(1, 1).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_input_1_1").await, "-2.0");
    assert!(!session.crosspoint_muted(1, 1));
}

#[tokio::test]
async fn test_crosspoint_unmute_without_saved_gain_restores_zero() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    // state as found after a reconnect: muted on the device, nothing saved
    device
        .send_report(feedback, "/gain/input/3/3/unit1", &[OscArg::Float(-120.0)])
        .await;
    wait_variable(&mut events, "gain_input_3_3").await;

    session.toggle_crosspoint_mute(3, 3).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_input_3_3").await, "0");

    let cmd = device.recv_until("/gain/input/3/3/unit1").await;
    assert_eq!(cmd.args, vec![OscArg::Float(0.0)]);
}

#[tokio::test]
async fn test_channel_mute_modes() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;

    session.set_input_mute(1, MuteMode::On).await.unwrap();
    let cmd = device.recv_until("/mute/input/1/unit1").await;
    assert_eq!(cmd.args, vec![OscArg::Bool(true)]);
    assert_eq!(wait_variable(&mut events, "mute_input_1").await, "1");
    assert!(session.input_muted(1));

    session.set_input_mute(1, MuteMode::Toggle).await.unwrap();
    assert_eq!(wait_variable(&mut events, "mute_input_1").await, "0");
    assert!(!session.input_muted(1));

    session.set_output_mute(5, MuteMode::Toggle).await.unwrap();
    assert_eq!(wait_variable(&mut events, "mute_output_5").await, "1");
    assert!(session.output_muted(5));

    session.set_output_mute(5, MuteMode::Off).await.unwrap();
    assert_eq!(wait_variable(&mut events, "mute_output_5").await, "0");
}

#[tokio::test]
async fn test_action_registry_dispatch() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;

    let action = Action::SetOutputGain {
        output: 1,
        gain: -10.0,
    };
    assert_eq!(action.name(), "set_output_gain");
    session.apply(action).await.unwrap();

    let cmd = device.recv_until("/gain/output/1/unit1").await;
    assert_eq!(cmd.args, vec![OscArg::Float(-10.0)]);
    assert_eq!(wait_variable(&mut events, "gain_output_1").await, "-10.0");
}

#[tokio::test]
async fn test_invalid_channel_rejected() {
    let device = FakeDevice::bind().await;
    let (session, _events) = start_session(&device).await;

    assert!(session.set_output_gain(0, 0.0).await.is_err());
    assert!(session.set_crosspoint_gain(9, 1, 0.0).await.is_err());
    assert!(session.set_input_mute(200, MuteMode::On).await.is_err());
}

#[tokio::test]
async fn test_device_echo_wins_the_race_eventually() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    // optimistic local write
    session.set_crosspoint_gain(1, 2, -6.4).await.unwrap();
    assert_eq!(wait_variable(&mut events, "gain_input_1_2").await, "-6.4");

    // authoritative echo arrives later with the device's own value
    device
        .send_report(feedback, "/gain/input/1/2/unit1", &[OscArg::Float(-7.0)])
        .await;
    assert_eq!(wait_variable(&mut events, "gain_input_1_2").await, "-7.0");
    assert_eq!(session.variable("gain_input_1_2").as_deref(), Some("-7.0"));
}

#[tokio::test]
async fn test_variable_registration_order_and_labels() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    device
        .send_report(feedback, "/gain/input/2/5/unit1", &[OscArg::Float(-3.0)])
        .await;
    wait_variable(&mut events, "gain_input_2_5").await;
    device
        .send_report(feedback, "/mute/input/2/unit1", &[OscArg::Bool(false)])
        .await;
    wait_variable(&mut events, "mute_input_2").await;

    let ids: Vec<String> = session.variables().into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids, ["gain_input_2_5", "mute_input_2"]);

    assert_eq!(
        session.variable_label("gain_input_2_5"),
        "Gain: Analog in 2 -> Dante out 1"
    );
    assert_eq!(session.variable_label("mute_input_2"), "Mute: Analog in 2");
}

#[tokio::test]
async fn test_bad_configuration_is_terminal() {
    let (session, mut events) = Session::start(DeviceConfig::default());
    wait_status(&mut events, ConnectionStatus::Unconfigured).await;
    assert_eq!(session.status(), ConnectionStatus::Unconfigured);

    // operations are registered but inert: no socket, no panic
    session.set_output_gain(1, 0.0).await.unwrap();
    assert!(session.variable("gain_output_1").is_some());
}

#[tokio::test]
async fn test_resolution_failure_reports_failed() {
    let config = DeviceConfig {
        host: "no-such-host.invalid".to_string(),
        device_name: "unit1".to_string(),
        ..Default::default()
    };
    let (session, mut events) = Session::start(config);
    wait_status(&mut events, ConnectionStatus::Failed).await;
    assert_eq!(session.status(), ConnectionStatus::Failed);
}

#[tokio::test]
async fn test_shutdown_clears_state() {
    let device = FakeDevice::bind().await;
    let (session, mut events) = start_session(&device).await;
    let feedback = session.local_addr().unwrap();

    device
        .send_report(feedback, "/gain/output/1/unit1", &[OscArg::Float(2.0)])
        .await;
    wait_variable(&mut events, "gain_output_1").await;

    session.shutdown();
    assert!(session.variables().is_empty());
    assert!(session.local_addr().is_none());

    // further commands are dropped, not errors
    session.ping().await;
}
