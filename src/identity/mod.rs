// Identity module - account addresses and the keys that own them

mod address;
mod keypair;

pub use address::*;
pub use keypair::*;
