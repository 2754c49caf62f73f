//! Mixlink client
//!
//! The session layer: owns the UDP socket lifecycle, keeps connection
//! status, reflects the device's asynchronous reports into the variable
//! store, and exposes the mixing operations (gain, mute, crosspoint
//! control) the host environment drives.
//!
//! ```no_run
//! use mixlink_client::{DeviceConfig, DeviceEvent, Session};
//!
//! # async fn demo() {
//! let config = DeviceConfig {
//!     host: "192.168.1.40".to_string(),
//!     device_name: "unit1".to_string(),
//!     ..Default::default()
//! };
//! let (session, mut events) = Session::start(config);
//! while let Some(event) = events.recv().await {
//!     match event {
//!         DeviceEvent::Status { status, label } => println!("{label}: {status:?}"),
//!         DeviceEvent::Variable { id, value } => println!("{id} = {value}"),
//!     }
//! }
//! # }
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod session;

pub use config::DeviceConfig;
pub use console::{Action, GainStep, MuteMode};
pub use error::{ClientError, Result};
pub use session::{ConnectionStatus, DeviceEvent, Session};
