// Intercore messaging: the deferred half of both event sources
//
// Runs only from the run loop. Every transport failure is logged once
// with its code and otherwise ignored; the loop keeps going. A socket
// that failed to open behaves as an invalid handle on every call.

use log::{error, info};

use super::events::Deferred;
use super::message::{MessageCounter, OutboundText, outbound_text, outbound_wire};
use crate::config::{HL_APP_ID, RECV_BUF_LEN};
use crate::transport::{Error, Inbound, Socket, SocketHandle};

pub struct Intercore<S: Socket> {
    socket: Option<S>,
    counter: MessageCounter,
    recv_buf: [u8; RECV_BUF_LEN],
}

impl<S: Socket> Intercore<S> {
    pub fn new(socket: Option<S>) -> Self {
        Self {
            socket,
            counter: MessageCounter::new(),
            recv_buf: [0u8; RECV_BUF_LEN],
        }
    }

    pub fn handle(&mut self, work: Deferred) {
        match work {
            Deferred::SendTimer => {
                let _ = self.send_next();
            }
            Deferred::MessageArrived(handle) => {
                let _ = self.receive(handle);
            }
        }
    }

    /// Format the next counter message and write it, 0-terminated, to the
    /// HL app.
    pub fn send_next(&mut self) -> Result<(), Error> {
        let text = outbound_text(self.counter.advance());
        let result = match self.socket.as_mut() {
            Some(socket) => socket.write(&HL_APP_ID, &outbound_wire(&text)),
            None => Err(Error::InvalidHandle),
        };
        if let Err(e) = result {
            error!("sending msg {} - {} ({})", text, e.code(), e);
        }
        result
    }

    /// Read the waiting message, terminate it, and log it with its sender.
    pub fn receive(&mut self, handle: SocketHandle) -> Result<usize, Error> {
        let msg = match self.read_into_buf(handle) {
            Ok(msg) => msg,
            Err(e) => {
                error!("receiving msg on {} - {} ({})", handle, e.code(), e);
                return Err(e);
            }
        };

        let text = &self.recv_buf[..msg.len];
        match core::str::from_utf8(text) {
            Ok(s) => info!("Message received: {}", s),
            Err(_) => info!("Message received: {:02x?}", text),
        }
        info!("Sender: {}", msg.sender);
        Ok(msg.len)
    }

    fn read_into_buf(&mut self, handle: SocketHandle) -> Result<Inbound, Error> {
        let socket = self
            .socket
            .as_mut()
            .filter(|s| s.handle() == handle)
            .ok_or(Error::InvalidHandle)?;

        // leave the last byte for the terminator
        let cap = self.recv_buf.len() - 1;
        let msg = socket.read(&mut self.recv_buf[..cap])?;
        self.recv_buf[msg.len] = 0;
        Ok(msg)
    }

    /// Last message as stored: payload followed by a 0 byte.
    pub fn recv_buf(&self) -> &[u8; RECV_BUF_LEN] {
        &self.recv_buf
    }

    pub fn counter(&self) -> MessageCounter {
        self.counter
    }

    /// Text the next send will carry.
    pub fn peek_next(&self) -> OutboundText {
        outbound_text(self.counter.value())
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use log::Level;

    use crate::apps::events::{self, EventQueue};
    use crate::drivers::frame;
    use crate::drivers::serial_socket::{RxPath, SerialSocket, TxLink};
    use crate::kernel;
    use crate::testlog;
    use crate::transport::ComponentId;

    const PEER: ComponentId = ComponentId::new(
        0x0102_0304,
        0x0506,
        0x0708,
        [0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10],
    );

    struct MockSocket {
        handle: SocketHandle,
        writes: Vec<(ComponentId, Vec<u8>)>,
        fail_with: Option<Error>,
        inbox: Option<(ComponentId, Vec<u8>)>,
    }

    impl MockSocket {
        fn new() -> Self {
            Self {
                handle: SocketHandle::new(0),
                writes: Vec::new(),
                fail_with: None,
                inbox: None,
            }
        }
    }

    impl Socket for MockSocket {
        fn handle(&self) -> SocketHandle {
            self.handle
        }

        fn write(&mut self, dest: &ComponentId, data: &[u8]) -> Result<(), Error> {
            self.writes.push((*dest, data.to_vec()));
            match self.fail_with {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<Inbound, Error> {
            let (sender, data) = self.inbox.take().ok_or(Error::NoMessage)?;
            if data.len() > buf.len() {
                return Err(Error::BufferTooSmall { needed: data.len() });
            }
            buf[..data.len()].copy_from_slice(&data);
            Ok(Inbound {
                sender,
                len: data.len(),
            })
        }
    }

    #[test]
    fn send_at_37_writes_exact_text_and_logs_nothing() {
        testlog::init();
        let mut app = Intercore::new(Some(MockSocket::new()));
        app.counter = MessageCounter::starting_at(37);

        assert_eq!(app.send_next(), Ok(()));

        let socket = app.socket.as_ref().unwrap();
        assert_eq!(socket.writes.len(), 1);
        let (dest, bytes) = &socket.writes[0];
        assert_eq!(*dest, HL_APP_ID);
        assert_eq!(bytes.len(), 20);
        assert_eq!(bytes.as_slice(), b"rt-app-to-hl-app-37\0");
        assert!(testlog::take().is_empty());
        assert_eq!(app.counter().value(), 38);
    }

    #[test]
    fn failed_send_logs_once_with_code_and_text() {
        testlog::init();
        let mut socket = MockSocket::new();
        socket.fail_with = Some(Error::Link);
        let mut app = Intercore::new(Some(socket));
        app.counter = MessageCounter::starting_at(37);

        assert_eq!(app.send_next(), Err(Error::Link));

        let lines = testlog::take();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::Error);
        assert!(lines[0].1.contains("rt-app-to-hl-app-37"));
        assert!(lines[0].1.contains(&Error::Link.code().to_string()));
    }

    #[test]
    fn counter_keeps_advancing_through_failures() {
        testlog::init();
        let mut app: Intercore<MockSocket> = Intercore::new(None);
        for _ in 0..101 {
            assert_eq!(app.send_next(), Err(Error::InvalidHandle));
        }
        assert_eq!(app.peek_next().as_str(), "rt-app-to-hl-app-01");
        assert_eq!(testlog::take_at(Level::Error).len(), 101);
    }

    #[test]
    fn receive_terminates_and_logs_sender() {
        testlog::init();
        let mut socket = MockSocket::new();
        socket.inbox = Some((PEER, b"hello hl".to_vec()));
        let mut app = Intercore::new(Some(socket));
        app.recv_buf = [0xaa; RECV_BUF_LEN];

        assert_eq!(app.receive(SocketHandle::new(0)), Ok(8));
        assert_eq!(&app.recv_buf()[..8], b"hello hl");
        assert_eq!(app.recv_buf()[8], 0);

        let lines = testlog::take_at(Level::Info);
        assert!(lines.iter().any(|l| l == "Message received: hello hl"));
        assert!(
            lines
                .iter()
                .any(|l| l == "Sender: 01020304-0506-0708-090a-0b0c0d0e0f10")
        );
    }

    #[test]
    fn receive_leaves_room_for_terminator() {
        testlog::init();
        let mut socket = MockSocket::new();
        socket.inbox = Some((PEER, vec![b'x'; RECV_BUF_LEN]));
        let mut app = Intercore::new(Some(socket));

        assert_eq!(
            app.receive(SocketHandle::new(0)),
            Err(Error::BufferTooSmall { needed: RECV_BUF_LEN })
        );
        assert_eq!(testlog::take_at(Level::Error).len(), 1);
    }

    #[test]
    fn receive_with_foreign_handle_is_invalid() {
        testlog::init();
        let mut socket = MockSocket::new();
        socket.inbox = Some((PEER, b"hi".to_vec()));
        let mut app = Intercore::new(Some(socket));

        assert_eq!(app.receive(SocketHandle::new(9)), Err(Error::InvalidHandle));
        assert!(app.socket.as_ref().unwrap().inbox.is_some());
    }

    #[test]
    fn receive_with_nothing_waiting_logs_no_message() {
        testlog::init();
        let mut app = Intercore::new(Some(MockSocket::new()));
        app.recv_buf[..5].copy_from_slice(b"stale");
        assert_eq!(app.receive(SocketHandle::new(0)), Err(Error::NoMessage));

        // only the error; nothing from the previous contents of the buffer
        let lines = testlog::take();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::Error);
        assert!(lines[0].1.contains(&Error::NoMessage.code().to_string()));
        assert!(!lines[0].1.contains("stale"));
    }

    #[derive(Default)]
    struct LoopbackTx {
        out: Vec<u8>,
    }

    impl TxLink for LoopbackTx {
        type Error = ();

        fn write_byte(&mut self, byte: u8) -> nb::Result<(), ()> {
            self.out.push(byte);
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), ()> {
            Ok(())
        }
    }

    // ISR-side byte feed -> receive callback -> enqueue -> drain -> read
    #[test]
    fn serial_link_end_to_end() {
        static QUEUE: EventQueue = EventQueue::new();
        static RX: RxPath = RxPath::new(2);
        fn on_message(handle: SocketHandle) {
            events::message_arrived(&QUEUE, handle);
        }

        testlog::init();
        let socket = SerialSocket::open(LoopbackTx::default(), &RX, on_message);
        let mut app = Intercore::new(socket);
        assert!(app.is_connected());

        let mut wire = frame::encode_header(&PEER, 5).to_vec();
        wire.extend_from_slice(b"pong!");
        RX.feed(&wire);
        events::send_timer_expired(&QUEUE);
        events::send_timer_expired(&QUEUE);

        let invoked = kernel::run_pass(&QUEUE, &mut |_, work| app.handle(work));
        assert_eq!(invoked, 2);
        assert!(QUEUE.is_empty());

        assert_eq!(&app.recv_buf()[..6], b"pong!\0");
        let sent = &app.socket.as_mut().unwrap().link().out;
        let header = frame::encode_header(&HL_APP_ID, 20);
        assert_eq!(&sent[..header.len()], &header);
        assert_eq!(&sent[header.len()..], b"rt-app-to-hl-app-00\0");

        let lines = testlog::take_at(Level::Info);
        assert!(lines.iter().any(|l| l == "Message received: pong!"));
    }
}
