// Link-level drivers, board-independent.
//
// Only the UART instance and pins (in board/) are board-specific.

pub mod frame;
pub mod serial_socket;

pub use serial_socket::{Drops, RxPath, SerialSocket, TxLink};
